use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::{
    AssignmentStatus, NewNightShift, NightShift, NightShiftAssignment, NightShiftId,
    NightShiftPatch, ShiftAssignmentId, ShiftFilter,
};
use crate::clock::Clock;
use crate::outbound::Notifier;
use crate::persistence::UnitOfWork;
use crate::workflows::courses::{Course, CourseId};
use crate::workflows::users::{Role, UserId};
use crate::workflows::{messages, required_text, ServiceError};

/// Deep link sent with shift notifications.
pub const NIGHT_SHIFT_LINK: &str = "/night-shifts";

const MAX_LOCATION: usize = 200;
const MAX_STAFF: u32 = 20;

pub struct NightShiftService<U, N> {
    store: Arc<U>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<U, N> NightShiftService<U, N>
where
    U: UnitOfWork + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<U>, notifier: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    pub async fn create_shift(&self, draft: NewNightShift) -> Result<NightShift, ServiceError> {
        let course = self.load_course(draft.course_id).await?;
        let now = self.clock.now();
        let shift = NightShift {
            id: NightShiftId::default(),
            course_id: draft.course_id,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            location: draft.location,
            required_staff: draft.required_staff,
            note: draft.note,
            created_at: now,
            updated_at: now,
        };
        let shift = validate(shift, &course)?;

        let shift = self.store.night_shifts().add(shift).await?;
        self.store.save_changes().await?;
        info!(shift_id = %shift.id, course_id = %shift.course_id, date = %shift.date, "night shift created");
        Ok(shift)
    }

    pub async fn update_shift(
        &self,
        id: NightShiftId,
        patch: NightShiftPatch,
    ) -> Result<NightShift, ServiceError> {
        let mut shift = self.load(id).await?;
        let course = self.load_course(shift.course_id).await?;
        let previous_date = shift.date;
        shift.merge(patch);
        let mut shift = validate(shift, &course)?;

        let assigned = self
            .store
            .night_shift_assignments()
            .get_all(&|assignment: &NightShiftAssignment| assignment.night_shift_id == id)
            .await?;
        if (shift.required_staff as usize) < assigned.len() {
            return Err(ServiceError::invalid(messages::SHIFT_STAFF_BELOW_ASSIGNED));
        }
        if shift.date != previous_date {
            for assignment in &assigned {
                if self
                    .has_shift_on(assignment.user_id, shift.date, Some(id))
                    .await?
                {
                    return Err(ServiceError::invalid(messages::SHIFT_SAME_DAY_CONFLICT));
                }
            }
        }

        shift.updated_at = self.clock.now();
        self.store.night_shifts().update(shift.clone()).await?;
        self.store.save_changes().await?;
        info!(shift_id = %id, "night shift updated");
        Ok(shift)
    }

    pub async fn delete_shift(&self, id: NightShiftId) -> Result<(), ServiceError> {
        self.load(id).await?;
        if self.assigned_count(id).await? > 0 {
            return Err(ServiceError::invalid(messages::SHIFT_HAS_ASSIGNMENTS));
        }
        self.store.night_shifts().delete(id).await?;
        self.store.save_changes().await?;
        info!(shift_id = %id, "night shift deleted");
        Ok(())
    }

    pub async fn get_shift(&self, id: NightShiftId) -> Result<NightShift, ServiceError> {
        self.load(id).await
    }

    /// Shifts matching `filter`, ordered by date then start time.
    pub async fn list_shifts(&self, filter: &ShiftFilter) -> Result<Vec<NightShift>, ServiceError> {
        let mut shifts = self
            .store
            .night_shifts()
            .get_all(&|shift: &NightShift| filter.matches(shift))
            .await?;
        shifts.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.start_time.cmp(&b.start_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(shifts)
    }

    /// Put an active secretary or admin on a shift and notify them.
    pub async fn assign_staff(
        &self,
        shift_id: NightShiftId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> Result<NightShiftAssignment, ServiceError> {
        let shift = self.load(shift_id).await?;
        let user = self
            .store
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::USER_NOT_FOUND))?;
        if self.store.users().get_by_id(assigned_by).await?.is_none() {
            return Err(ServiceError::invalid(messages::USER_NOT_FOUND));
        }
        if !user.is_active() {
            return Err(ServiceError::invalid(messages::STAFF_INACTIVE));
        }
        if !matches!(user.role, Role::Secretary | Role::Admin) {
            return Err(ServiceError::invalid(messages::STAFF_ROLE_REQUIRED));
        }

        let on_shift = self
            .store
            .night_shift_assignments()
            .get_all(&|assignment: &NightShiftAssignment| assignment.night_shift_id == shift_id)
            .await?;
        if on_shift.iter().any(|assignment| assignment.user_id == user_id) {
            return Err(ServiceError::invalid(messages::ALREADY_ON_SHIFT));
        }
        if on_shift.len() >= shift.required_staff as usize {
            return Err(ServiceError::invalid(messages::SHIFT_FULL));
        }

        if self.has_shift_on(user_id, shift.date, None).await? {
            return Err(ServiceError::invalid(messages::SHIFT_SAME_DAY_CONFLICT));
        }

        let now = self.clock.now();
        let assignment = NightShiftAssignment {
            id: ShiftAssignmentId::default(),
            night_shift_id: shift_id,
            user_id,
            assigned_by,
            status: AssignmentStatus::Assigned,
            created_at: now,
            updated_at: now,
        };
        let assignment = self.store.night_shift_assignments().add(assignment).await?;
        self.store.save_changes().await?;
        info!(assignment_id = %assignment.id, %shift_id, %user_id, "staff assigned to night shift");

        let message = format!(
            "Bạn được phân công trực đêm ngày {} từ {} đến {} tại {}",
            shift.date.format("%d/%m/%Y"),
            shift.start_time.format("%H:%M"),
            shift.end_time.format("%H:%M"),
            shift.location
        );
        self.notifier
            .notify_user(user_id, &message, NIGHT_SHIFT_LINK)
            .await?;
        Ok(assignment)
    }

    pub async fn unassign(&self, id: ShiftAssignmentId) -> Result<(), ServiceError> {
        let assignment = self.load_assignment(id).await?;
        self.store.night_shift_assignments().delete(id).await?;
        self.store.save_changes().await?;
        info!(assignment_id = %id, shift_id = %assignment.night_shift_id, "staff removed from night shift");
        Ok(())
    }

    pub async fn set_assignment_status(
        &self,
        id: ShiftAssignmentId,
        status: AssignmentStatus,
    ) -> Result<NightShiftAssignment, ServiceError> {
        let mut assignment = self.load_assignment(id).await?;
        assignment.status = status;
        assignment.updated_at = self.clock.now();
        self.store
            .night_shift_assignments()
            .update(assignment.clone())
            .await?;
        self.store.save_changes().await?;
        info!(assignment_id = %id, status = status.label(), "night shift attendance recorded");
        Ok(assignment)
    }

    pub async fn assignments_for_shift(
        &self,
        shift_id: NightShiftId,
    ) -> Result<Vec<NightShiftAssignment>, ServiceError> {
        self.load(shift_id).await?;
        let assignments = self
            .store
            .night_shift_assignments()
            .get_all(&|assignment: &NightShiftAssignment| assignment.night_shift_id == shift_id)
            .await?;
        Ok(assignments)
    }

    /// The user's assignments on shifts dated `from` or later, soonest first.
    pub async fn assignments_for_user(
        &self,
        user_id: UserId,
        from: NaiveDate,
    ) -> Result<Vec<(NightShift, NightShiftAssignment)>, ServiceError> {
        let assignments = self
            .store
            .night_shift_assignments()
            .get_all(&|assignment: &NightShiftAssignment| assignment.user_id == user_id)
            .await?;

        let mut schedule = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            if let Some(shift) = self
                .store
                .night_shifts()
                .get_by_id(assignment.night_shift_id)
                .await?
            {
                if shift.date >= from {
                    schedule.push((shift, assignment));
                }
            }
        }
        schedule.sort_by(|(a, _), (b, _)| a.date.cmp(&b.date).then(a.start_time.cmp(&b.start_time)));
        Ok(schedule)
    }

    /// Whether `user_id` already holds a shift dated `date`, ignoring `except`.
    async fn has_shift_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
        except: Option<NightShiftId>,
    ) -> Result<bool, ServiceError> {
        let booked: HashSet<NightShiftId> = self
            .store
            .night_shift_assignments()
            .get_all(&|assignment: &NightShiftAssignment| assignment.user_id == user_id)
            .await?
            .into_iter()
            .map(|assignment| assignment.night_shift_id)
            .filter(|shift_id| Some(*shift_id) != except)
            .collect();
        if booked.is_empty() {
            return Ok(false);
        }
        let same_day = self
            .store
            .night_shifts()
            .count(&|other: &NightShift| booked.contains(&other.id) && other.date == date)
            .await?;
        Ok(same_day > 0)
    }

    async fn assigned_count(&self, shift_id: NightShiftId) -> Result<usize, ServiceError> {
        let count = self
            .store
            .night_shift_assignments()
            .count(&|assignment: &NightShiftAssignment| assignment.night_shift_id == shift_id)
            .await?;
        Ok(count)
    }

    async fn load(&self, id: NightShiftId) -> Result<NightShift, ServiceError> {
        self.store
            .night_shifts()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::SHIFT_NOT_FOUND))
    }

    async fn load_assignment(
        &self,
        id: ShiftAssignmentId,
    ) -> Result<NightShiftAssignment, ServiceError> {
        self.store
            .night_shift_assignments()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::SHIFT_ASSIGNMENT_NOT_FOUND))
    }

    async fn load_course(&self, id: CourseId) -> Result<Course, ServiceError> {
        self.store
            .courses()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::COURSE_NOT_FOUND))
    }
}

fn validate(mut shift: NightShift, course: &Course) -> Result<NightShift, ServiceError> {
    if !course.runs_on(shift.date) {
        return Err(ServiceError::invalid(messages::SHIFT_OUTSIDE_COURSE));
    }
    if shift.start_time == shift.end_time {
        return Err(ServiceError::invalid(messages::SHIFT_TIMES_INVALID));
    }
    shift.location = required_text(
        &shift.location,
        MAX_LOCATION,
        messages::SHIFT_LOCATION_REQUIRED,
        messages::SHIFT_LOCATION_TOO_LONG,
    )?;
    if shift.required_staff == 0 || shift.required_staff > MAX_STAFF {
        return Err(ServiceError::invalid(messages::SHIFT_STAFF_OUT_OF_RANGE));
    }
    shift.note = shift
        .note
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty());
    Ok(shift)
}

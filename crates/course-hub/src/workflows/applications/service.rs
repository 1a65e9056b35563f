use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::allocator::{plan_assignments, SecretaryLoad};
use super::domain::{ApplicationId, ApplicationStatus, ReviewDecision, StudentCourse};
use crate::clock::Clock;
use crate::outbound::Notifier;
use crate::persistence::UnitOfWork;
use crate::workflows::courses::{Course, CourseId, CourseStatus};
use crate::workflows::users::{Role, User, UserId};
use crate::workflows::{messages, ServiceError};

/// Deep link sent to secretaries who receive new applications.
pub const APPLICATION_LIST_LINK: &str = "/applications";

/// Intake, review and distribution of student applications.
pub struct ApplicationService<U, N> {
    store: Arc<U>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<U, N> ApplicationService<U, N>
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

    /// Submit a pending application for `student_id` to `course_id`.
    pub async fn apply(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<StudentCourse, ServiceError> {
        let student = self
            .store
            .users()
            .get_by_id(student_id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::USER_NOT_FOUND))?;
        if student.role != Role::Student {
            return Err(ServiceError::invalid(messages::NOT_A_STUDENT));
        }
        if !student.is_active() {
            return Err(ServiceError::invalid(messages::STUDENT_INACTIVE));
        }
        let student_code = student
            .student_code
            .clone()
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| ServiceError::invalid(messages::STUDENT_CODE_REQUIRED))?;

        let course = self.load_course(course_id).await?;
        let now = self.clock.now();
        if course.status != CourseStatus::Open {
            return Err(ServiceError::invalid(messages::COURSE_NOT_OPEN));
        }
        if !course.accepts_applications_on(now.date_naive()) {
            return Err(ServiceError::invalid(messages::OUTSIDE_APPLICATION_WINDOW));
        }

        let duplicates = self
            .store
            .applications()
            .count(&|application: &StudentCourse| {
                application.course_id == course_id && application.student_id == student_id
            })
            .await?;
        if duplicates > 0 {
            return Err(ServiceError::invalid(messages::ALREADY_APPLIED));
        }

        let application = StudentCourse {
            id: ApplicationId::default(),
            course_id,
            student_id,
            student_code,
            reviewer_id: None,
            status: ApplicationStatus::Pending,
            note: None,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            reviewed_at: None,
        };
        let application = self.store.applications().add(application).await?;
        self.store.save_changes().await?;
        info!(
            application_id = %application.id,
            %course_id,
            %student_id,
            "application submitted"
        );
        Ok(application)
    }

    /// Approve or reject a pending application and notify the student.
    pub async fn review(
        &self,
        application_id: ApplicationId,
        reviewer_id: UserId,
        decision: ReviewDecision,
        note: Option<String>,
    ) -> Result<StudentCourse, ServiceError> {
        let mut application = self.load(application_id).await?;
        let reviewer = self
            .store
            .users()
            .get_by_id(reviewer_id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::USER_NOT_FOUND))?;

        if application.status != ApplicationStatus::Pending {
            return Err(ServiceError::invalid(messages::APPLICATION_ALREADY_REVIEWED));
        }
        let may_review = match reviewer.role {
            Role::Admin => reviewer.is_active(),
            Role::Secretary => {
                reviewer.is_active() && application.reviewer_id == Some(reviewer_id)
            }
            Role::Student => false,
        };
        if !may_review {
            return Err(ServiceError::invalid(messages::NOT_ASSIGNED_REVIEWER));
        }

        let course = self.load_course(application.course_id).await?;
        let note = note
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty());
        let status = match decision {
            ReviewDecision::Approve => {
                let course_id = course.id;
                let approved = self
                    .store
                    .applications()
                    .count(&|other: &StudentCourse| {
                        other.course_id == course_id && other.status == ApplicationStatus::Approved
                    })
                    .await?;
                if approved >= course.max_students as usize {
                    return Err(ServiceError::invalid(messages::COURSE_FULL));
                }
                ApplicationStatus::Approved
            }
            ReviewDecision::Reject => {
                if note.is_none() {
                    return Err(ServiceError::invalid(messages::REJECTION_NOTE_REQUIRED));
                }
                ApplicationStatus::Rejected
            }
        };

        let now = self.clock.now();
        application.status = status;
        application.note = note;
        application.reviewed_at = Some(now);
        application.updated_at = now;
        if application.reviewer_id.is_none() {
            application.reviewer_id = Some(reviewer_id);
            application.assigned_at = Some(now);
        }
        self.store.applications().update(application.clone()).await?;
        self.store.save_changes().await?;
        info!(
            %application_id,
            %reviewer_id,
            status = status.label(),
            "application reviewed"
        );

        let message = match (status, application.note.as_deref()) {
            (ApplicationStatus::Rejected, Some(reason)) => format!(
                "Đơn đăng ký khóa học {} của bạn đã bị từ chối: {}",
                course.name, reason
            ),
            (ApplicationStatus::Rejected, None) => {
                format!("Đơn đăng ký khóa học {} của bạn đã bị từ chối", course.name)
            }
            _ => format!("Đơn đăng ký khóa học {} của bạn đã được duyệt", course.name),
        };
        self.notifier
            .notify_user(
                application.student_id,
                &message,
                &format!("/courses/{}", course.id),
            )
            .await?;

        Ok(application)
    }

    pub async fn get_application(
        &self,
        id: ApplicationId,
    ) -> Result<StudentCourse, ServiceError> {
        self.load(id).await
    }

    pub async fn list_for_course(
        &self,
        course_id: CourseId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<StudentCourse>, ServiceError> {
        self.load_course(course_id).await?;
        let applications = self
            .store
            .applications()
            .get_all(&|application: &StudentCourse| {
                application.course_id == course_id
                    && status.map_or(true, |status| application.status == status)
            })
            .await?;
        Ok(applications)
    }

    pub async fn list_for_reviewer(
        &self,
        reviewer_id: UserId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<StudentCourse>, ServiceError> {
        let applications = self
            .store
            .applications()
            .get_all(&|application: &StudentCourse| {
                application.reviewer_id == Some(reviewer_id)
                    && status.map_or(true, |status| application.status == status)
            })
            .await?;
        Ok(applications)
    }

    /// Distribute the course's unassigned applications over the active
    /// secretaries, least-loaded first, then notify every secretary that
    /// received work.
    pub async fn auto_assign_applications(&self, course_id: CourseId) -> Result<(), ServiceError> {
        let mut secretaries = self
            .store
            .users()
            .get_all(&|user: &User| user.is_active_secretary())
            .await?;
        secretaries.sort_by_key(|secretary| secretary.id);
        if secretaries.is_empty() {
            warn!(%course_id, "allocation skipped: no active secretaries");
            return Err(ServiceError::invalid(messages::NO_SECRETARIES));
        }

        let unassigned = self
            .store
            .applications()
            .get_all(&|application: &StudentCourse| {
                application.course_id == course_id && application.is_unassigned()
            })
            .await?;
        if unassigned.is_empty() {
            warn!(%course_id, "allocation skipped: nothing left to assign");
            return Err(ServiceError::invalid(messages::ALL_APPLICATIONS_ASSIGNED));
        }

        let mut loads = Vec::with_capacity(secretaries.len());
        for secretary in &secretaries {
            let secretary_id = secretary.id;
            let assigned = self
                .store
                .applications()
                .count(&|application: &StudentCourse| {
                    application.reviewer_id == Some(secretary_id)
                        && application.course_id == course_id
                })
                .await?;
            loads.push(SecretaryLoad {
                secretary_id,
                assigned,
            });
        }

        let batch: Vec<ApplicationId> = unassigned.iter().map(|application| application.id).collect();
        let plan = plan_assignments(&loads, &batch);

        let now = self.clock.now();
        let mut received: BTreeMap<UserId, usize> = BTreeMap::new();
        for (mut application, assignment) in unassigned.into_iter().zip(plan) {
            application.reviewer_id = Some(assignment.secretary_id);
            application.assigned_at = Some(now);
            application.updated_at = now;
            self.store.applications().update(application).await?;
            *received.entry(assignment.secretary_id).or_default() += 1;
        }

        let affected = self.store.save_changes().await?;
        info!(
            %course_id,
            assigned = batch.len(),
            secretaries = received.len(),
            affected,
            "applications distributed"
        );

        for (secretary_id, count) in received {
            let message = format!("Bạn được phân công {} đơn đăng ký mới cần xử lý", count);
            self.notifier
                .notify_user(secretary_id, &message, APPLICATION_LIST_LINK)
                .await?;
        }

        Ok(())
    }

    async fn load(&self, id: ApplicationId) -> Result<StudentCourse, ServiceError> {
        self.store
            .applications()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::APPLICATION_NOT_FOUND))
    }

    async fn load_course(&self, id: CourseId) -> Result<Course, ServiceError> {
        self.store
            .courses()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::COURSE_NOT_FOUND))
    }
}

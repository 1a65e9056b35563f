use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::domain::{Course, CourseFilter, CourseId, CoursePatch, CourseStatus, NewCourse};
use crate::clock::Clock;
use crate::persistence::UnitOfWork;
use crate::workflows::applications::{ApplicationStatus, StudentCourse};
use crate::workflows::{messages, required_text, ServiceError};

const MAX_NAME: usize = 200;
const MAX_STUDENTS: u32 = 1000;

pub struct CourseService<U> {
    store: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> CourseService<U>
where
    U: UnitOfWork + 'static,
{
    pub fn new(store: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a course in `Draft` status.
    pub async fn create_course(&self, draft: NewCourse) -> Result<Course, ServiceError> {
        let now = self.clock.now();
        let course = Course {
            id: CourseId::default(),
            name: draft.name,
            description: draft.description.trim().to_string(),
            location: draft.location.trim().to_string(),
            max_students: draft.max_students,
            start_date: draft.start_date,
            end_date: draft.end_date,
            application_start: draft.application_start,
            application_end: draft.application_end,
            status: CourseStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        let course = validate(course)?;
        self.ensure_name_free(&course.name, None).await?;

        let course = self.store.courses().add(course).await?;
        self.store.save_changes().await?;
        info!(course_id = %course.id, name = %course.name, "course created");
        Ok(course)
    }

    pub async fn update_course(
        &self,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<Course, ServiceError> {
        let mut course = self.load(id).await?;
        let renamed = patch.name.is_some();
        let resized = patch.max_students.is_some();

        course.merge(patch);
        let mut course = validate(course)?;
        if renamed {
            self.ensure_name_free(&course.name, Some(id)).await?;
        }
        if resized {
            let approved = self
                .store
                .applications()
                .count(&|application: &StudentCourse| {
                    application.course_id == id
                        && application.status == ApplicationStatus::Approved
                })
                .await?;
            if (course.max_students as usize) < approved {
                return Err(ServiceError::invalid(
                    messages::COURSE_CAPACITY_BELOW_APPROVED,
                ));
            }
        }

        course.updated_at = self.clock.now();
        self.store.courses().update(course.clone()).await?;
        self.store.save_changes().await?;
        info!(course_id = %id, "course updated");
        Ok(course)
    }

    pub async fn set_status(
        &self,
        id: CourseId,
        status: CourseStatus,
    ) -> Result<Course, ServiceError> {
        let mut course = self.load(id).await?;
        if course.status == status {
            return Ok(course);
        }
        course.status = status;
        course.updated_at = self.clock.now();
        self.store.courses().update(course.clone()).await?;
        self.store.save_changes().await?;
        info!(course_id = %id, status = status.label(), "course status changed");
        Ok(course)
    }

    /// Delete a course that has not received any application.
    pub async fn delete_course(&self, id: CourseId) -> Result<(), ServiceError> {
        self.load(id).await?;
        let applications = self
            .store
            .applications()
            .count(&|application: &StudentCourse| application.course_id == id)
            .await?;
        if applications > 0 {
            return Err(ServiceError::invalid(messages::COURSE_HAS_APPLICATIONS));
        }

        self.store.courses().delete(id).await?;
        self.store.save_changes().await?;
        info!(course_id = %id, "course deleted");
        Ok(())
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Course, ServiceError> {
        self.load(id).await
    }

    /// Courses matching `filter`, soonest start first.
    pub async fn list_courses(&self, filter: &CourseFilter) -> Result<Vec<Course>, ServiceError> {
        let mut courses = self
            .store
            .courses()
            .get_all(&|course: &Course| filter.matches(course))
            .await?;
        courses.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(courses)
    }

    /// Open courses whose application window contains `today`.
    pub async fn open_for_applications(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Course>, ServiceError> {
        let courses = self
            .store
            .courses()
            .get_all(&|course: &Course| course.accepts_applications_on(today))
            .await?;
        Ok(courses)
    }

    async fn load(&self, id: CourseId) -> Result<Course, ServiceError> {
        self.store
            .courses()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::COURSE_NOT_FOUND))
    }

    async fn ensure_name_free(
        &self,
        name: &str,
        except: Option<CourseId>,
    ) -> Result<(), ServiceError> {
        let lowered = name.to_lowercase();
        let taken = self
            .store
            .courses()
            .count(&|course: &Course| {
                Some(course.id) != except && course.name.to_lowercase() == lowered
            })
            .await?;
        if taken > 0 {
            return Err(ServiceError::invalid(messages::COURSE_NAME_TAKEN));
        }
        Ok(())
    }
}

/// Field and schedule rules shared by create and update.
fn validate(mut course: Course) -> Result<Course, ServiceError> {
    course.name = required_text(
        &course.name,
        MAX_NAME,
        messages::COURSE_NAME_REQUIRED,
        messages::COURSE_NAME_TOO_LONG,
    )?;
    if course.max_students == 0 || course.max_students > MAX_STUDENTS {
        return Err(ServiceError::invalid(messages::COURSE_CAPACITY_OUT_OF_RANGE));
    }
    if course.start_date >= course.end_date {
        return Err(ServiceError::invalid(messages::COURSE_DATES_INVALID));
    }
    if course.application_start >= course.application_end {
        return Err(ServiceError::invalid(messages::APPLICATION_WINDOW_INVALID));
    }
    if course.application_end > course.start_date {
        return Err(ServiceError::invalid(
            messages::APPLICATION_WINDOW_AFTER_START,
        ));
    }
    Ok(course)
}

//! Fixtures and failing doubles shared by the service test suites.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::clock::{Clock, FixedClock};
use crate::outbound::{Notifier, NotifyError};
use crate::persistence::{Entity, Filter, MemoryStore, Repository, RepositoryError, UnitOfWork};
use crate::workflows::applications::{ApplicationId, ApplicationStatus, StudentCourse};
use crate::workflows::courses::{Course, CourseId, CourseStatus};
use crate::workflows::night_shifts::{NightShift, NightShiftAssignment, NightShiftId};
use crate::workflows::posts::Post;
use crate::workflows::teams::{Team, TeamId};
use crate::workflows::users::{Role, User, UserId, UserStatus};

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

/// Inside the fixture course's application window.
pub(crate) fn today() -> NaiveDate {
    date(2025, 6, 10)
}

pub(crate) fn now() -> DateTime<Utc> {
    FixedClock::on(today()).now()
}

pub(crate) fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(today()))
}

pub(crate) fn user(id: u64, role: Role) -> User {
    User {
        id: UserId(id),
        full_name: format!("Người dùng {id}"),
        email: format!("user{id}@example.edu"),
        student_code: (role == Role::Student).then(|| format!("SV{id:03}")),
        phone: None,
        role,
        status: UserStatus::Active,
        password_hash: String::new(),
        created_at: now(),
        updated_at: now(),
    }
}

pub(crate) fn secretary(id: u64) -> User {
    user(id, Role::Secretary)
}

pub(crate) fn student(id: u64) -> User {
    user(id, Role::Student)
}

pub(crate) fn admin(id: u64) -> User {
    user(id, Role::Admin)
}

pub(crate) fn inactive(mut user: User) -> User {
    user.status = UserStatus::Inactive;
    user
}

/// Open course: applications 2025-06-01..=06-30, runs 2025-07-01..=07-31.
pub(crate) fn course(id: u64) -> Course {
    Course {
        id: CourseId(id),
        name: format!("Mùa hè xanh {id}"),
        description: "Chiến dịch tình nguyện".to_string(),
        location: "Cần Thơ".to_string(),
        max_students: 30,
        start_date: date(2025, 7, 1),
        end_date: date(2025, 7, 31),
        application_start: date(2025, 6, 1),
        application_end: date(2025, 6, 30),
        status: CourseStatus::Open,
        created_at: now(),
        updated_at: now(),
    }
}

pub(crate) fn application(
    id: u64,
    course_id: u64,
    student_id: u64,
    reviewer_id: Option<u64>,
) -> StudentCourse {
    StudentCourse {
        id: ApplicationId(id),
        course_id: CourseId(course_id),
        student_id: UserId(student_id),
        student_code: format!("SV{student_id:03}"),
        reviewer_id: reviewer_id.map(UserId),
        status: ApplicationStatus::Pending,
        note: None,
        created_at: now(),
        updated_at: now(),
        assigned_at: reviewer_id.map(|_| now()),
        reviewed_at: None,
    }
}

pub(crate) fn approved(mut application: StudentCourse) -> StudentCourse {
    application.status = ApplicationStatus::Approved;
    application.reviewed_at = Some(now());
    application
}

pub(crate) fn team(id: u64, course_id: u64, name: &str, max_members: u32) -> Team {
    Team {
        id: TeamId(id),
        course_id: CourseId(course_id),
        name: name.to_string(),
        leader_id: None,
        member_ids: Vec::new(),
        max_members,
        created_at: now(),
        updated_at: now(),
    }
}

/// 22:00 to 06:00 the next morning, two staff.
pub(crate) fn shift(id: u64, course_id: u64, on: NaiveDate) -> NightShift {
    NightShift {
        id: NightShiftId(id),
        course_id: CourseId(course_id),
        date: on,
        start_time: time(22, 0),
        end_time: time(6, 0),
        location: "Nhà văn hóa xã".to_string(),
        required_staff: 2,
        note: None,
        created_at: now(),
        updated_at: now(),
    }
}

/// Repository whose every call fails as if the database were down.
pub(crate) struct OfflineRepository;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

#[async_trait]
impl<E: Entity> Repository<E> for OfflineRepository {
    async fn get_by_id(&self, _id: E::Id) -> Result<Option<E>, RepositoryError> {
        Err(offline())
    }

    async fn find(&self, _filter: Filter<'_, E>) -> Result<Option<E>, RepositoryError> {
        Err(offline())
    }

    async fn get_all(&self, _filter: Filter<'_, E>) -> Result<Vec<E>, RepositoryError> {
        Err(offline())
    }

    async fn count(&self, _filter: Filter<'_, E>) -> Result<usize, RepositoryError> {
        Err(offline())
    }

    async fn add(&self, _entity: E) -> Result<E, RepositoryError> {
        Err(offline())
    }

    async fn update(&self, _entity: E) -> Result<(), RepositoryError> {
        Err(offline())
    }

    async fn delete(&self, _id: E::Id) -> Result<(), RepositoryError> {
        Err(offline())
    }
}

pub(crate) struct OfflineStore;

#[async_trait]
impl UnitOfWork for OfflineStore {
    fn courses(&self) -> &dyn Repository<Course> {
        &OfflineRepository
    }

    fn users(&self) -> &dyn Repository<User> {
        &OfflineRepository
    }

    fn applications(&self) -> &dyn Repository<StudentCourse> {
        &OfflineRepository
    }

    fn posts(&self) -> &dyn Repository<Post> {
        &OfflineRepository
    }

    fn teams(&self) -> &dyn Repository<Team> {
        &OfflineRepository
    }

    fn night_shifts(&self) -> &dyn Repository<NightShift> {
        &OfflineRepository
    }

    fn night_shift_assignments(&self) -> &dyn Repository<NightShiftAssignment> {
        &OfflineRepository
    }

    async fn save_changes(&self) -> Result<usize, RepositoryError> {
        Err(offline())
    }
}

/// Memory store whose reads and staging work but whose commit is refused.
#[derive(Default)]
pub(crate) struct CommitFailingStore {
    pub(crate) inner: MemoryStore,
}

#[async_trait]
impl UnitOfWork for CommitFailingStore {
    fn courses(&self) -> &dyn Repository<Course> {
        self.inner.courses()
    }

    fn users(&self) -> &dyn Repository<User> {
        self.inner.users()
    }

    fn applications(&self) -> &dyn Repository<StudentCourse> {
        self.inner.applications()
    }

    fn posts(&self) -> &dyn Repository<Post> {
        self.inner.posts()
    }

    fn teams(&self) -> &dyn Repository<Team> {
        self.inner.teams()
    }

    fn night_shifts(&self) -> &dyn Repository<NightShift> {
        self.inner.night_shifts()
    }

    fn night_shift_assignments(&self) -> &dyn Repository<NightShiftAssignment> {
        self.inner.night_shift_assignments()
    }

    async fn save_changes(&self) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("commit rejected".to_string()))
    }
}

pub(crate) struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify_user(
        &self,
        _user_id: UserId,
        _message: &str,
        _link: &str,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("push gateway down".to_string()))
    }
}

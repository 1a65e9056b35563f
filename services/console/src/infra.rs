use chrono::NaiveDate;
use course_hub::clock::{Clock, FixedClock, SystemClock};
use course_hub::config::AppConfig;
use course_hub::error::AppError;
use course_hub::outbound::{MemoryBlobStore, RecordingMailer, RecordingNotifier};
use course_hub::persistence::MemoryStore;
use course_hub::security::SaltedSha256;
use course_hub::telemetry;
use course_hub::workflows::applications::ApplicationService;
use course_hub::workflows::courses::CourseService;
use course_hub::workflows::night_shifts::NightShiftService;
use course_hub::workflows::posts::PostService;
use course_hub::workflows::teams::TeamService;
use course_hub::workflows::users::UserService;
use std::sync::Arc;
use tracing::info;

/// Every service wired to one in-memory store and the recording collaborators.
pub(crate) struct Runtime {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) mailer: Arc<RecordingMailer>,
    pub(crate) blobs: Arc<MemoryBlobStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) users: UserService<MemoryStore, RecordingMailer>,
    pub(crate) courses: CourseService<MemoryStore>,
    pub(crate) applications: ApplicationService<MemoryStore, RecordingNotifier>,
    pub(crate) posts: PostService<MemoryStore, MemoryBlobStore>,
    pub(crate) teams: TeamService<MemoryStore>,
    pub(crate) night_shifts: NightShiftService<MemoryStore, RecordingNotifier>,
}

/// Load configuration, start tracing and build the runtime. `today` pins the
/// clock for reproducible runs.
pub(crate) fn bootstrap(today: Option<NaiveDate>) -> Result<Runtime, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let clock: Arc<dyn Clock> = match today {
        Some(day) => Arc::new(FixedClock::on(day)),
        None => Arc::new(SystemClock),
    };
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let mailer = Arc::new(RecordingMailer::new(config.mail.sender.clone()));
    let blobs = Arc::new(MemoryBlobStore::new(config.storage.public_base_url.clone()));

    let runtime = Runtime {
        users: UserService::new(
            store.clone(),
            mailer.clone(),
            Arc::new(SaltedSha256),
            clock.clone(),
        ),
        courses: CourseService::new(store.clone(), clock.clone()),
        applications: ApplicationService::new(store.clone(), notifier.clone(), clock.clone()),
        posts: PostService::new(store.clone(), blobs.clone(), clock.clone(), &config.storage),
        teams: TeamService::new(store.clone(), clock.clone()),
        night_shifts: NightShiftService::new(store.clone(), notifier.clone(), clock.clone()),
        store,
        notifier,
        mailer,
        blobs,
        clock,
    };

    info!(environment = ?config.environment, today = %runtime.clock.today(), "course-hub console ready");
    Ok(runtime)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

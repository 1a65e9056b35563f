use std::sync::Arc;

use crate::outbound::RecordingNotifier;
use crate::persistence::MemoryStore;
use crate::workflows::applications::{ApplicationService, StudentCourse};
use crate::workflows::testing::clock;
use crate::workflows::users::UserId;

pub(super) fn build_service() -> (
    ApplicationService<MemoryStore, RecordingNotifier>,
    Arc<MemoryStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = ApplicationService::new(store.clone(), notifier.clone(), clock());
    (service, store, notifier)
}

pub(super) fn reviewer_of(store: &MemoryStore, id: u64) -> Option<UserId> {
    store
        .applications
        .rows()
        .into_iter()
        .find(|application: &StudentCourse| application.id.0 == id)
        .and_then(|application| application.reviewer_id)
}

pub(super) fn assigned_to(store: &MemoryStore, secretary: u64) -> usize {
    store
        .applications
        .rows()
        .iter()
        .filter(|application| application.reviewer_id == Some(UserId(secretary)))
        .count()
}

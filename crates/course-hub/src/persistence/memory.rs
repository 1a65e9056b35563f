use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::{Entity, Filter, Repository, RepositoryError, UnitOfWork};
use crate::workflows::applications::StudentCourse;
use crate::workflows::courses::Course;
use crate::workflows::night_shifts::{NightShift, NightShiftAssignment};
use crate::workflows::posts::Post;
use crate::workflows::teams::Team;
use crate::workflows::users::User;

enum Staged<E: Entity> {
    Insert(E),
    Update(E),
    Delete(E::Id),
}

struct TableState<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    staged: Vec<Staged<E>>,
    next_id: u64,
    update_calls: usize,
}

impl<E: Entity> TableState<E> {
    fn is_known(&self, id: E::Id) -> bool {
        self.rows.contains_key(&id)
            || self
                .staged
                .iter()
                .any(|change| matches!(change, Staged::Insert(row) if row.id() == id))
    }
}

/// One entity table with committed rows and a queue of staged mutations.
pub struct MemoryTable<E: Entity> {
    state: Mutex<TableState<E>>,
}

impl<E: Entity> Default for MemoryTable<E> {
    fn default() -> Self {
        Self {
            state: Mutex::new(TableState {
                rows: BTreeMap::new(),
                staged: Vec::new(),
                next_id: 1,
                update_calls: 0,
            }),
        }
    }
}

impl<E: Entity> MemoryTable<E> {
    fn lock(&self) -> MutexGuard<'_, TableState<E>> {
        self.state.lock().expect("memory table mutex poisoned")
    }

    /// Insert committed rows directly, bypassing the unit of work. Rows with a
    /// zero id get the next free id.
    pub fn seed<I>(&self, rows: I) -> Vec<E>
    where
        I: IntoIterator<Item = E>,
    {
        let mut state = self.lock();
        let mut seeded = Vec::new();
        for mut row in rows {
            let raw: u64 = row.id().into();
            if raw == 0 {
                let id = state.next_id;
                row.assign_id(E::Id::from(id));
                state.next_id += 1;
            } else {
                state.next_id = state.next_id.max(raw + 1);
            }
            state.rows.insert(row.id(), row.clone());
            seeded.push(row);
        }
        seeded
    }

    /// Committed rows in id order.
    pub fn rows(&self) -> Vec<E> {
        self.lock().rows.values().cloned().collect()
    }

    pub fn get(&self, id: E::Id) -> Option<E> {
        self.lock().rows.get(&id).cloned()
    }

    pub fn staged_len(&self) -> usize {
        self.lock().staged.len()
    }

    /// Number of `update` calls accepted since creation.
    pub fn update_calls(&self) -> usize {
        self.lock().update_calls
    }

    fn commit(&self) -> usize {
        let mut state = self.lock();
        let staged = std::mem::take(&mut state.staged);
        let mut affected = 0;
        for change in staged {
            match change {
                Staged::Insert(row) => {
                    state.rows.insert(row.id(), row);
                    affected += 1;
                }
                Staged::Update(row) => {
                    if let Some(slot) = state.rows.get_mut(&row.id()) {
                        *slot = row;
                        affected += 1;
                    }
                }
                Staged::Delete(id) => {
                    if state.rows.remove(&id).is_some() {
                        affected += 1;
                    }
                }
            }
        }
        affected
    }

    fn discard(&self) {
        self.lock().staged.clear();
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryTable<E> {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn find(&self, filter: Filter<'_, E>) -> Result<Option<E>, RepositoryError> {
        let state = self.lock();
        Ok(state.rows.values().find(|row| filter(*row)).cloned())
    }

    async fn get_all(&self, filter: Filter<'_, E>) -> Result<Vec<E>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .rows
            .values()
            .filter(|row| filter(*row))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: Filter<'_, E>) -> Result<usize, RepositoryError> {
        let state = self.lock();
        Ok(state.rows.values().filter(|row| filter(*row)).count())
    }

    async fn add(&self, mut entity: E) -> Result<E, RepositoryError> {
        let mut state = self.lock();
        let raw: u64 = entity.id().into();
        if raw == 0 {
            let id = state.next_id;
            entity.assign_id(E::Id::from(id));
            state.next_id += 1;
        } else if state.is_known(entity.id()) {
            return Err(RepositoryError::conflict::<E>(entity.id()));
        } else {
            state.next_id = state.next_id.max(raw + 1);
        }
        state.staged.push(Staged::Insert(entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if !state.is_known(entity.id()) {
            return Err(RepositoryError::not_found::<E>(entity.id()));
        }
        state.update_calls += 1;
        state.staged.push(Staged::Update(entity));
        Ok(())
    }

    async fn delete(&self, id: E::Id) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if !state.is_known(id) {
            return Err(RepositoryError::not_found::<E>(id));
        }
        state.staged.push(Staged::Delete(id));
        Ok(())
    }
}

/// In-process unit of work backing the console and the test suites.
#[derive(Default)]
pub struct MemoryStore {
    pub courses: MemoryTable<Course>,
    pub users: MemoryTable<User>,
    pub applications: MemoryTable<StudentCourse>,
    pub posts: MemoryTable<Post>,
    pub teams: MemoryTable<Team>,
    pub night_shifts: MemoryTable<NightShift>,
    pub night_shift_assignments: MemoryTable<NightShiftAssignment>,
    commits: AtomicUsize,
}

impl MemoryStore {
    /// Number of successful `save_changes` calls.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::Acquire)
    }

    /// Staged mutations not yet committed, across every table.
    pub fn pending_changes(&self) -> usize {
        self.courses.staged_len()
            + self.users.staged_len()
            + self.applications.staged_len()
            + self.posts.staged_len()
            + self.teams.staged_len()
            + self.night_shifts.staged_len()
            + self.night_shift_assignments.staged_len()
    }

    /// Drop every staged mutation without applying it.
    pub fn rollback(&self) {
        self.courses.discard();
        self.users.discard();
        self.applications.discard();
        self.posts.discard();
        self.teams.discard();
        self.night_shifts.discard();
        self.night_shift_assignments.discard();
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    fn courses(&self) -> &dyn Repository<Course> {
        &self.courses
    }

    fn users(&self) -> &dyn Repository<User> {
        &self.users
    }

    fn applications(&self) -> &dyn Repository<StudentCourse> {
        &self.applications
    }

    fn posts(&self) -> &dyn Repository<Post> {
        &self.posts
    }

    fn teams(&self) -> &dyn Repository<Team> {
        &self.teams
    }

    fn night_shifts(&self) -> &dyn Repository<NightShift> {
        &self.night_shifts
    }

    fn night_shift_assignments(&self) -> &dyn Repository<NightShiftAssignment> {
        &self.night_shift_assignments
    }

    async fn save_changes(&self) -> Result<usize, RepositoryError> {
        let affected = self.courses.commit()
            + self.users.commit()
            + self.applications.commit()
            + self.posts.commit()
            + self.teams.commit()
            + self.night_shifts.commit()
            + self.night_shift_assignments.commit();
        self.commits.fetch_add(1, Ordering::AcqRel);
        debug!(affected, "memory store committed");
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::users::{Role, User, UserId, UserStatus};
    use chrono::{TimeZone, Utc};

    fn user(id: u64, email: &str) -> User {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        User {
            id: UserId(id),
            full_name: "Nguyễn Văn A".to_string(),
            email: email.to_string(),
            student_code: None,
            phone: None,
            role: Role::Secretary,
            status: UserStatus::Active,
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn staged_rows_are_invisible_until_commit() {
        let store = MemoryStore::default();
        let added = store
            .users()
            .add(user(0, "a@example.edu"))
            .await
            .expect("add succeeds");
        assert_eq!(added.id, UserId(1));
        assert!(store.users().get_by_id(added.id).await.unwrap().is_none());

        let affected = store.save_changes().await.expect("commit succeeds");
        assert_eq!(affected, 1);
        assert_eq!(store.commit_count(), 1);
        assert!(store.users().get_by_id(added.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn seeding_advances_the_id_sequence() {
        let store = MemoryStore::default();
        store.users.seed([user(7, "a@example.edu")]);
        let added = store.users().add(user(0, "b@example.edu")).await.unwrap();
        assert_eq!(added.id, UserId(8));
    }

    #[tokio::test]
    async fn update_and_delete_require_a_known_row() {
        let store = MemoryStore::default();
        match store.users().update(user(3, "c@example.edu")).await {
            Err(RepositoryError::NotFound { entity, id }) => {
                assert_eq!(entity, "user");
                assert_eq!(id, "3");
            }
            other => panic!("expected not found, got {other:?}"),
        }
        assert!(store.users().delete(UserId(3)).await.is_err());
        assert_eq!(store.users.update_calls(), 0);
    }

    #[tokio::test]
    async fn explicit_ids_conflict_with_existing_rows() {
        let store = MemoryStore::default();
        store.users.seed([user(2, "a@example.edu")]);
        let result = store.users().add(user(2, "dup@example.edu")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn rollback_discards_staged_mutations() {
        let store = MemoryStore::default();
        store.users.seed([user(1, "a@example.edu")]);
        let mut changed = user(1, "changed@example.edu");
        changed.status = UserStatus::Inactive;
        store.users().update(changed).await.unwrap();
        store.users().delete(UserId(1)).await.unwrap();
        assert_eq!(store.pending_changes(), 2);

        store.rollback();
        assert_eq!(store.pending_changes(), 0);
        assert_eq!(store.save_changes().await.unwrap(), 0);
        assert_eq!(
            store.users.get(UserId(1)).map(|row| row.email),
            Some("a@example.edu".to_string())
        );
    }

    #[tokio::test]
    async fn filters_run_against_committed_rows() {
        let store = MemoryStore::default();
        let mut admin = user(0, "admin@example.edu");
        admin.role = Role::Admin;
        store
            .users
            .seed([user(0, "s1@example.edu"), admin, user(0, "s2@example.edu")]);

        let secretaries = store
            .users()
            .get_all(&|row: &User| row.role == Role::Secretary)
            .await
            .unwrap();
        assert_eq!(
            secretaries.iter().map(|row| row.id).collect::<Vec<_>>(),
            vec![UserId(1), UserId(3)]
        );
        assert_eq!(
            store
                .users()
                .count(&|row: &User| row.role == Role::Admin)
                .await
                .unwrap(),
            1
        );
        let first = store
            .users()
            .find(&|row: &User| row.email.starts_with('s'))
            .await
            .unwrap();
        assert_eq!(first.map(|row| row.id), Some(UserId(1)));
    }
}

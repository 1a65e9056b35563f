//! Persistence gateway consumed by every service.
//!
//! Reads go straight to the store; `add`/`update`/`delete` only stage a
//! mutation, which becomes visible once [`UnitOfWork::save_changes`] commits
//! it.

pub mod memory;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use async_trait::async_trait;

use crate::workflows::applications::StudentCourse;
use crate::workflows::courses::Course;
use crate::workflows::night_shifts::{NightShift, NightShiftAssignment};
use crate::workflows::posts::Post;
use crate::workflows::teams::Team;
use crate::workflows::users::User;

pub use memory::{MemoryStore, MemoryTable};

/// Declares a `u64` identifier newtype for an entity. Zero means "not yet
/// persisted".
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use entity_id;

/// Row type owned by the store.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy
        + Eq
        + Ord
        + Hash
        + Debug
        + Display
        + From<u64>
        + Into<u64>
        + Send
        + Sync
        + 'static;

    const NAME: &'static str;

    fn id(&self) -> Self::Id;
    fn assign_id(&mut self, id: Self::Id);
}

/// Row predicate used by `find`, `get_all` and `count`.
pub type Filter<'a, E> = &'a (dyn Fn(&E) -> bool + Send + Sync);

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, RepositoryError>;

    /// First row matching `filter`, in id order.
    async fn find(&self, filter: Filter<'_, E>) -> Result<Option<E>, RepositoryError>;

    /// Every row matching `filter`, in id order.
    async fn get_all(&self, filter: Filter<'_, E>) -> Result<Vec<E>, RepositoryError>;

    async fn count(&self, filter: Filter<'_, E>) -> Result<usize, RepositoryError>;

    /// Stage an insert. A zero id is replaced by the next free id.
    async fn add(&self, entity: E) -> Result<E, RepositoryError>;

    async fn update(&self, entity: E) -> Result<(), RepositoryError>;

    async fn delete(&self, id: E::Id) -> Result<(), RepositoryError>;
}

/// Transactional boundary over every repository.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn courses(&self) -> &dyn Repository<Course>;
    fn users(&self) -> &dyn Repository<User>;
    fn applications(&self) -> &dyn Repository<StudentCourse>;
    fn posts(&self) -> &dyn Repository<Post>;
    fn teams(&self) -> &dyn Repository<Team>;
    fn night_shifts(&self) -> &dyn Repository<NightShift>;
    fn night_shift_assignments(&self) -> &dyn Repository<NightShiftAssignment>;

    /// Commit every staged mutation, returning the affected row count.
    async fn save_changes(&self) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} {id} already exists")]
    Conflict { entity: &'static str, id: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub(crate) fn not_found<E: Entity>(id: E::Id) -> Self {
        Self::NotFound {
            entity: E::NAME,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict<E: Entity>(id: E::Id) -> Self {
        Self::Conflict {
            entity: E::NAME,
            id: id.to_string(),
        }
    }
}

//! Outbound collaborators: in-app notifications, templated e-mail and the
//! blob store holding post images.

pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workflows::users::UserId;

pub use memory::{MemoryBlobStore, RecordingMailer, RecordingNotifier};

/// In-app notification delivered to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    pub message: String,
    pub link: String,
}

/// Templated e-mail request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub address: String,
    pub template_key: String,
    pub substitutions: BTreeMap<String, String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_user(
        &self,
        user_id: UserId,
        message: &str,
        link: &str,
    ) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(
        &self,
        address: &str,
        template_key: &str,
        substitutions: &BTreeMap<String, String>,
    ) -> Result<(), EmailError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn upload_blob(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError>;

    async fn delete_blob(&self, key: &str) -> Result<(), BlobError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("unknown e-mail template '{0}'")]
    UnknownTemplate(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob '{0}' not found")]
    NotFound(String),
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

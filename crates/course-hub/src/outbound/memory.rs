use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use super::{
    BlobError, BlobStore, EmailError, EmailSender, Notification, Notifier, NotifyError,
    OutboundEmail,
};
use crate::workflows::users::UserId;

/// Notifier that keeps every delivered notification in memory.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn events_for(&self, user_id: UserId) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter(|event| event.user_id == user_id)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_user(
        &self,
        user_id: UserId,
        message: &str,
        link: &str,
    ) -> Result<(), NotifyError> {
        debug!(%user_id, link, "notification recorded");
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(Notification {
                user_id,
                message: message.to_string(),
                link: link.to_string(),
            });
        Ok(())
    }
}

/// Mailer that records rendered requests instead of delivering them.
#[derive(Clone)]
pub struct RecordingMailer {
    sender: String,
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl RecordingMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            sent: Arc::default(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new("no-reply@course-hub.local")
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_email(
        &self,
        address: &str,
        template_key: &str,
        substitutions: &BTreeMap<String, String>,
    ) -> Result<(), EmailError> {
        if template_key.trim().is_empty() {
            return Err(EmailError::UnknownTemplate(template_key.to_string()));
        }
        debug!(from = %self.sender, to = address, template_key, "e-mail recorded");
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(OutboundEmail {
                address: address.to_string(),
                template_key: template_key.to_string(),
                substitutions: substitutions.clone(),
            });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Blob store keeping objects in a map and serving them under `base_url`.
#[derive(Clone)]
pub struct MemoryBlobStore {
    base_url: String,
    blobs: Arc<Mutex<BTreeMap<String, StoredBlob>>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: Arc::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.blobs
            .lock()
            .expect("blob mutex poisoned")
            .get(key)
            .cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.blobs
            .lock()
            .expect("blob mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload_blob(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError> {
        self.blobs.lock().expect("blob mutex poisoned").insert(
            key.to_string(),
            StoredBlob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn delete_blob(&self, key: &str) -> Result<(), BlobError> {
        match self.blobs.lock().expect("blob mutex poisoned").remove(key) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blob_urls_are_rooted_at_the_base_url() {
        let store = MemoryBlobStore::new("https://cdn.example.edu/posts");
        let url = store
            .upload_blob("posts/1/cover.png", "image/png", vec![1, 2, 3])
            .await
            .expect("upload succeeds");
        assert_eq!(url, "https://cdn.example.edu/posts/posts/1/cover.png");
        assert_eq!(store.keys(), vec!["posts/1/cover.png".to_string()]);

        store.delete_blob("posts/1/cover.png").await.unwrap();
        assert!(matches!(
            store.delete_blob("posts/1/cover.png").await,
            Err(BlobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn mailer_rejects_blank_templates() {
        let mailer = RecordingMailer::default();
        let result = mailer
            .send_email("a@example.edu", " ", &BTreeMap::new())
            .await;
        assert!(matches!(result, Err(EmailError::UnknownTemplate(_))));
        assert!(mailer.sent().is_empty());
    }
}

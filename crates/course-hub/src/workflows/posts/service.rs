use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{ImageUpload, NewPost, Post, PostFilter, PostId, PostImage, PostPatch};
use crate::clock::Clock;
use crate::config::StorageConfig;
use crate::outbound::BlobStore;
use crate::persistence::UnitOfWork;
use crate::workflows::courses::CourseId;
use crate::workflows::users::UserId;
use crate::workflows::{messages, required_text, ServiceError};

const MAX_TITLE: usize = 255;
const ACCEPTED_IMAGE_SUBTYPES: [&str; 4] = ["jpeg", "png", "gif", "webp"];

pub struct PostService<U, B> {
    store: Arc<U>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
    max_image_bytes: usize,
}

impl<U, B> PostService<U, B>
where
    U: UnitOfWork + 'static,
    B: BlobStore + 'static,
{
    pub fn new(
        store: Arc<U>,
        blobs: Arc<B>,
        clock: Arc<dyn Clock>,
        storage: &StorageConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            clock,
            max_image_bytes: storage.max_image_bytes,
        }
    }

    /// Validate and store a post; the image is uploaded before the row is
    /// persisted.
    pub async fn create_post(&self, author_id: UserId, draft: NewPost) -> Result<Post, ServiceError> {
        let author = self
            .store
            .users()
            .get_by_id(author_id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::USER_NOT_FOUND))?;
        if !author.is_active() {
            return Err(ServiceError::invalid(messages::AUTHOR_INACTIVE));
        }
        let title = required_text(
            &draft.title,
            MAX_TITLE,
            messages::POST_TITLE_REQUIRED,
            messages::POST_TITLE_TOO_LONG,
        )?;
        let content = required_content(&draft.content)?;
        if let Some(course_id) = draft.course_id {
            self.ensure_course(course_id).await?;
        }
        if let Some(upload) = draft.image.as_ref() {
            self.check_image(upload)?;
        }

        let now = self.clock.now();
        let image = match draft.image {
            Some(upload) => Some(self.upload(author_id, upload).await?),
            None => None,
        };
        let post = Post {
            id: PostId::default(),
            author_id,
            course_id: draft.course_id,
            title,
            content,
            image: image.clone(),
            published: draft.published,
            created_at: now,
            updated_at: now,
        };

        let post = match self.persist_new(post).await {
            Ok(post) => post,
            Err(err) => {
                if let Some(image) = image {
                    self.discard_blob(&image.key).await;
                }
                return Err(err);
            }
        };
        info!(post_id = %post.id, %author_id, "post created");
        Ok(post)
    }

    /// Merge `patch` and optionally replace the image. The previous blob is
    /// deleted only after the new state is committed.
    pub async fn update_post(
        &self,
        id: PostId,
        mut patch: PostPatch,
        image: Option<ImageUpload>,
    ) -> Result<Post, ServiceError> {
        let mut post = self.load(id).await?;
        if let Some(title) = patch.title.as_deref() {
            patch.title = Some(required_text(
                title,
                MAX_TITLE,
                messages::POST_TITLE_REQUIRED,
                messages::POST_TITLE_TOO_LONG,
            )?);
        }
        if let Some(content) = patch.content.as_deref() {
            patch.content = Some(required_content(content)?);
        }
        if let Some(course_id) = patch.course_id {
            self.ensure_course(course_id).await?;
        }
        if let Some(upload) = image.as_ref() {
            self.check_image(upload)?;
        }

        post.merge(patch);
        let fresh = match image {
            Some(upload) => Some(self.upload(post.author_id, upload).await?),
            None => None,
        };
        let replaced = match fresh.clone() {
            Some(image) => post.image.replace(image),
            None => None,
        };
        post.updated_at = self.clock.now();

        if let Err(err) = self.persist_update(post.clone()).await {
            let previous_key = replaced.as_ref().map(|old| old.key.as_str());
            if let Some(fresh) = fresh.filter(|fresh| Some(fresh.key.as_str()) != previous_key) {
                self.discard_blob(&fresh.key).await;
            }
            return Err(err);
        }
        let current_key = post.image.as_ref().map(|image| image.key.as_str());
        if let Some(old) = replaced.filter(|old| Some(old.key.as_str()) != current_key) {
            self.blobs.delete_blob(&old.key).await?;
        }
        info!(post_id = %id, "post updated");
        Ok(post)
    }

    pub async fn set_published(&self, id: PostId, published: bool) -> Result<Post, ServiceError> {
        let patch = PostPatch {
            published: Some(published),
            ..PostPatch::default()
        };
        self.update_post(id, patch, None).await
    }

    pub async fn delete_post(&self, id: PostId) -> Result<(), ServiceError> {
        let post = self.load(id).await?;
        self.store.posts().delete(id).await?;
        self.store.save_changes().await?;
        if let Some(image) = post.image {
            self.blobs.delete_blob(&image.key).await?;
        }
        info!(post_id = %id, "post deleted");
        Ok(())
    }

    pub async fn get_post(&self, id: PostId) -> Result<Post, ServiceError> {
        self.load(id).await
    }

    /// Posts matching `filter`, newest first.
    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ServiceError> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ServiceError::invalid(messages::POST_DATE_RANGE_INVALID));
            }
        }
        let mut posts = self
            .store
            .posts()
            .get_all(&|post: &Post| filter.matches(post))
            .await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn persist_new(&self, post: Post) -> Result<Post, ServiceError> {
        let post = self.store.posts().add(post).await?;
        self.store.save_changes().await?;
        Ok(post)
    }

    async fn persist_update(&self, post: Post) -> Result<(), ServiceError> {
        self.store.posts().update(post).await?;
        self.store.save_changes().await?;
        Ok(())
    }

    async fn upload(&self, author_id: UserId, upload: ImageUpload) -> Result<PostImage, ServiceError> {
        let key = format!(
            "posts/{}/{}-{}",
            author_id,
            self.clock.now().timestamp_millis(),
            sanitize_file_name(&upload.file_name)
        );
        let url = self
            .blobs
            .upload_blob(&key, &upload.content_type, upload.bytes)
            .await?;
        Ok(PostImage { key, url })
    }

    async fn discard_blob(&self, key: &str) {
        if let Err(err) = self.blobs.delete_blob(key).await {
            warn!(key, error = %err, "orphaned post image could not be removed");
        }
    }

    fn check_image(&self, upload: &ImageUpload) -> Result<(), ServiceError> {
        let accepted = upload
            .content_type
            .trim()
            .parse::<mime::Mime>()
            .map(|parsed| {
                parsed.type_() == mime::IMAGE
                    && ACCEPTED_IMAGE_SUBTYPES.contains(&parsed.subtype().as_str())
            })
            .unwrap_or(false);
        if !accepted {
            return Err(ServiceError::invalid(messages::IMAGE_TYPE_UNSUPPORTED));
        }
        if upload.bytes.is_empty() {
            return Err(ServiceError::invalid(messages::IMAGE_EMPTY));
        }
        if upload.bytes.len() > self.max_image_bytes {
            return Err(ServiceError::invalid(messages::IMAGE_TOO_LARGE));
        }
        Ok(())
    }

    async fn ensure_course(&self, course_id: CourseId) -> Result<(), ServiceError> {
        match self.store.courses().get_by_id(course_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::invalid(messages::COURSE_NOT_FOUND)),
        }
    }

    async fn load(&self, id: PostId) -> Result<Post, ServiceError> {
        self.store
            .posts()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::invalid(messages::POST_NOT_FOUND))
    }
}

fn required_content(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid(messages::POST_CONTENT_REQUIRED));
    }
    Ok(trimmed.to_string())
}

/// Keep ASCII alphanumerics, dots, dashes and underscores; everything else
/// becomes `-`.
fn sanitize_file_name(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.trim_matches(['-', '.']).is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{entity_id, Entity};
use crate::workflows::courses::CourseId;
use crate::workflows::users::UserId;

entity_id!(
    /// Identifier of a post.
    PostId
);

/// Stored image: blob key plus the URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub course_id: Option<CourseId>,
    pub title: String,
    pub content: String,
    pub image: Option<PostImage>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Post {
    type Id = PostId;
    const NAME: &'static str = "post";

    fn id(&self) -> PostId {
        self.id
    }

    fn assign_id(&mut self, id: PostId) {
        self.id = id;
    }
}

impl Post {
    pub fn merge(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(course_id) = patch.course_id {
            self.course_id = Some(course_id);
        }
        if let Some(published) = patch.published {
            self.published = published;
        }
    }
}

/// Raw upload received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub course_id: Option<CourseId>,
    pub published: bool,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author_id: Option<UserId>,
    pub course_id: Option<CourseId>,
    pub published: Option<bool>,
    /// Inclusive lower bound on the creation date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub to: Option<NaiveDate>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        let created = post.created_at.date_naive();
        self.author_id.map_or(true, |author| post.author_id == author)
            && self.course_id.map_or(true, |course| post.course_id == Some(course))
            && self.published.map_or(true, |published| post.published == published)
            && self.from.map_or(true, |from| created >= from)
            && self.to.map_or(true, |to| created <= to)
    }
}

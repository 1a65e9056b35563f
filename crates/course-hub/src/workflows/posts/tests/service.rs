use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::config::StorageConfig;
use crate::outbound::MemoryBlobStore;
use crate::persistence::{MemoryStore, RepositoryError, UnitOfWork};
use crate::workflows::courses::CourseId;
use crate::workflows::messages;
use crate::workflows::posts::{
    ImageUpload, NewPost, Post, PostFilter, PostId, PostImage, PostPatch, PostService,
};
use crate::workflows::testing::*;
use crate::workflows::users::UserId;
use crate::workflows::ServiceError;

const BASE_URL: &str = "https://cdn.example.edu/course-hub";

fn storage() -> StorageConfig {
    StorageConfig {
        public_base_url: BASE_URL.to_string(),
        max_image_bytes: 16,
    }
}

fn build_service() -> (
    PostService<MemoryStore, MemoryBlobStore>,
    Arc<MemoryStore>,
    Arc<MemoryBlobStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let blobs = Arc::new(MemoryBlobStore::new(BASE_URL));
    let service = PostService::new(store.clone(), blobs.clone(), clock(), &storage());
    (service, store, blobs)
}

fn png(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

fn new_post(image: Option<ImageUpload>) -> NewPost {
    NewPost {
        title: " Thông báo tập trung ".to_string(),
        content: "Sinh viên có mặt lúc 7h.".to_string(),
        course_id: Some(CourseId(1)),
        published: true,
        image,
    }
}

fn post(id: u64, author: u64, day: u32, published: bool) -> Post {
    let created = Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0).unwrap();
    Post {
        id: PostId(id),
        author_id: UserId(author),
        course_id: None,
        title: format!("Bài {id}"),
        content: "Nội dung".to_string(),
        image: None,
        published,
        created_at: created,
        updated_at: created,
    }
}

fn image_key(author: u64, file: &str) -> String {
    format!("posts/{}/{}-{}", author, now().timestamp_millis(), file)
}

#[tokio::test]
async fn create_post_uploads_the_image_under_the_author() {
    let (service, store, blobs) = build_service();
    store.courses.seed([course(1)]);
    store.users.seed([secretary(1)]);

    let post = service
        .create_post(UserId(1), new_post(Some(png("Cover.PNG"))))
        .await
        .expect("post created");

    let key = image_key(1, "cover.png");
    let image = post.image.clone().expect("image attached");
    assert_eq!(image.key, key);
    assert_eq!(image.url, format!("{BASE_URL}/{key}"));
    assert_eq!(post.title, "Thông báo tập trung");
    assert_eq!(blobs.get(&key).map(|blob| blob.content_type), Some("image/png".to_string()));
    assert_eq!(store.posts.rows(), vec![post]);
}

#[tokio::test]
async fn create_post_rejects_bad_images_before_uploading() {
    let (service, store, blobs) = build_service();
    store.courses.seed([course(1)]);
    store.users.seed([secretary(1)]);

    let mut pdf = png("cv.pdf");
    pdf.content_type = "application/pdf".to_string();
    let mut svg = png("logo.svg");
    svg.content_type = "image/svg+xml".to_string();
    let mut empty = png("empty.png");
    empty.bytes.clear();
    let mut large = png("large.png");
    large.bytes = vec![0; 17];

    let cases = [
        (pdf, messages::IMAGE_TYPE_UNSUPPORTED),
        (svg, messages::IMAGE_TYPE_UNSUPPORTED),
        (empty, messages::IMAGE_EMPTY),
        (large, messages::IMAGE_TOO_LARGE),
    ];
    for (upload, expected) in cases {
        let err = service
            .create_post(UserId(1), new_post(Some(upload)))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(expected));
    }
    assert!(blobs.keys().is_empty());
    assert!(store.posts.rows().is_empty());
}

#[tokio::test]
async fn create_post_checks_author_and_course() {
    let (service, store, _blobs) = build_service();
    store.users.seed([inactive(secretary(1)), secretary(2)]);

    let err = service.create_post(UserId(1), new_post(None)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::AUTHOR_INACTIVE));

    let err = service.create_post(UserId(2), new_post(None)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::COURSE_NOT_FOUND));

    let mut blank = new_post(None);
    blank.course_id = None;
    blank.content = "  ".to_string();
    let err = service.create_post(UserId(2), blank).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::POST_CONTENT_REQUIRED));
}

#[tokio::test]
async fn failed_commit_removes_the_uploaded_image() {
    let store = Arc::new(CommitFailingStore::default());
    store.inner.courses.seed([course(1)]);
    store.inner.users.seed([secretary(1)]);
    let blobs = Arc::new(MemoryBlobStore::new(BASE_URL));
    let service = PostService::new(store.clone(), blobs.clone(), clock(), &storage());

    let err = service
        .create_post(UserId(1), new_post(Some(png("cover.png"))))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Repository(RepositoryError::Unavailable(_))
    ));
    assert!(blobs.keys().is_empty());
    assert!(store.inner.posts.rows().is_empty());
}

#[tokio::test]
async fn failed_update_removes_the_replacement_image() {
    let store = Arc::new(CommitFailingStore::default());
    store.inner.courses.seed([course(1)]);
    store.inner.users.seed([secretary(1)]);
    let old_image = PostImage {
        key: "posts/1/old.png".to_string(),
        url: format!("{BASE_URL}/posts/1/old.png"),
    };
    let mut existing = post(1, 1, 5, true);
    existing.image = Some(old_image.clone());
    store.inner.posts.seed([existing]);
    let blobs = Arc::new(MemoryBlobStore::new(BASE_URL));
    let service = PostService::new(store.clone(), blobs.clone(), clock(), &storage());

    let err = service
        .update_post(PostId(1), PostPatch::default(), Some(png("new.png")))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Repository(RepositoryError::Unavailable(_))
    ));
    assert!(blobs.keys().is_empty());
    let row = store.inner.posts.get(PostId(1)).unwrap();
    assert_eq!(row.image, Some(old_image));
}

#[tokio::test]
async fn replacing_the_image_deletes_the_old_blob_after_commit() {
    let (service, store, blobs) = build_service();
    store.courses.seed([course(1)]);
    store.users.seed([secretary(1)]);
    let created = service
        .create_post(UserId(1), new_post(Some(png("old.png"))))
        .await
        .unwrap();

    let patch = PostPatch {
        title: Some("Cập nhật".to_string()),
        ..PostPatch::default()
    };
    let updated = service
        .update_post(created.id, patch, Some(png("new.png")))
        .await
        .expect("update succeeds");

    assert_eq!(updated.title, "Cập nhật");
    assert_eq!(blobs.keys(), vec![image_key(1, "new.png")]);
    assert_eq!(
        store.posts().get_by_id(created.id).await.unwrap().unwrap().image,
        updated.image
    );
}

#[tokio::test]
async fn reuploading_the_same_file_keeps_the_blob() {
    let (service, store, blobs) = build_service();
    store.courses.seed([course(1)]);
    store.users.seed([secretary(1)]);
    let created = service
        .create_post(UserId(1), new_post(Some(png("cover.png"))))
        .await
        .unwrap();

    service
        .update_post(created.id, PostPatch::default(), Some(png("cover.png")))
        .await
        .expect("update succeeds");

    assert_eq!(blobs.keys(), vec![image_key(1, "cover.png")]);
}

#[tokio::test]
async fn delete_post_removes_row_and_image() {
    let (service, store, blobs) = build_service();
    store.courses.seed([course(1)]);
    store.users.seed([secretary(1)]);
    let created = service
        .create_post(UserId(1), new_post(Some(png("cover.png"))))
        .await
        .unwrap();

    service.delete_post(created.id).await.unwrap();

    assert!(store.posts.rows().is_empty());
    assert!(blobs.keys().is_empty());
    let err = service.get_post(created.id).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::POST_NOT_FOUND));
}

#[tokio::test]
async fn list_posts_is_newest_first_within_the_range() {
    let (service, store, _blobs) = build_service();
    store.posts.seed([
        post(1, 1, 2, true),
        post(2, 1, 5, false),
        post(3, 2, 8, true),
        post(4, 1, 9, true),
    ]);

    let all = service.list_posts(&PostFilter::default()).await.unwrap();
    assert_eq!(
        all.iter().map(|post| post.id.0).collect::<Vec<_>>(),
        vec![4, 3, 2, 1]
    );

    let filter = PostFilter {
        author_id: Some(UserId(1)),
        published: Some(true),
        from: Some(date(2025, 6, 2)),
        to: Some(date(2025, 6, 8)),
        ..PostFilter::default()
    };
    let found = service.list_posts(&filter).await.unwrap();
    assert_eq!(found.iter().map(|post| post.id.0).collect::<Vec<_>>(), vec![1]);

    let inverted = PostFilter {
        from: Some(date(2025, 6, 9)),
        to: Some(date(2025, 6, 1)),
        ..PostFilter::default()
    };
    let err = service.list_posts(&inverted).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::POST_DATE_RANGE_INVALID));

    let unpublished = service.set_published(PostId(3), false).await.unwrap();
    assert!(!unpublished.published);
    assert_eq!(unpublished.updated_at, now());
}

//! Integration tests for the photo repository: duplicates, filters,
//! status transitions, quota usage and stats.

use gaestefotos_core::roles::ROLE_HOST_ID;
use gaestefotos_db::models::event::CreateEvent;
use gaestefotos_db::models::photo::{CreatePhoto, PhotoFilter, UpdatePhoto};
use gaestefotos_db::models::user::CreateUser;
use gaestefotos_db::repositories::{EventRepo, PhotoRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup_event(pool: &PgPool) -> i64 {
    let host = UserRepo::create(
        pool,
        &CreateUser {
            email: "photos@example.com".to_string(),
            password_hash: "x".to_string(),
            display_name: "Host".to_string(),
            role_id: ROLE_HOST_ID,
        },
    )
    .await
    .unwrap();
    EventRepo::create(
        pool,
        host.id,
        "gallery",
        &CreateEvent {
            title: "Gallery".to_string(),
            description: None,
            location: None,
            starts_at: None,
            ends_at: None,
            package_id: None,
            design_config: None,
            feature_config: None,
        },
        &serde_json::json!({}),
        &serde_json::json!({}),
    )
    .await
    .unwrap()
    .id
}

fn new_photo(event_id: i64, sha_seed: char, kind: &str, status: &str, size: i64) -> CreatePhoto {
    CreatePhoto {
        event_id,
        category_id: None,
        media_kind: kind.to_string(),
        storage_path: format!("events/{event_id}/{sha_seed}.bin"),
        original_filename: None,
        mime_type: if kind == "VIDEO" { "video/mp4" } else { "image/jpeg" }.to_string(),
        size_bytes: size,
        sha256: sha_seed.to_string().repeat(64),
        uploader_name: Some("Oma".to_string()),
        guest_key: Some("guest-1".to_string()),
        status: status.to_string(),
    }
}

fn filter(statuses: &[&str]) -> PhotoFilter {
    PhotoFilter {
        statuses: statuses.iter().map(|s| s.to_string()).collect(),
        limit: 50,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_content_rejected_until_deleted(pool: PgPool) {
    let event = setup_event(&pool).await;
    let first = PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "APPROVED", 5))
        .await
        .unwrap();

    let err = PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "APPROVED", 5))
        .await
        .unwrap_err();
    let db = err.as_database_error().unwrap();
    assert_eq!(db.code().as_deref(), Some("23505"));
    assert_eq!(db.constraint(), Some("uq_photos_event_sha256"));

    assert!(PhotoRepo::find_by_sha256(&pool, event, &"a".repeat(64))
        .await
        .unwrap()
        .is_some());

    PhotoRepo::transition_status(&pool, event, first.id, "APPROVED", "DELETED")
        .await
        .unwrap()
        .unwrap();
    assert!(PhotoRepo::find_by_sha256(&pool, event, &"a".repeat(64))
        .await
        .unwrap()
        .is_none());
    PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "APPROVED", 5))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_status(pool: PgPool) {
    let event = setup_event(&pool).await;
    PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "APPROVED", 1)).await.unwrap();
    PhotoRepo::create(&pool, &new_photo(event, 'b', "IMAGE", "PENDING", 1)).await.unwrap();
    PhotoRepo::create(&pool, &new_photo(event, 'c', "IMAGE", "DELETED", 1)).await.unwrap();

    let approved = PhotoRepo::list(&pool, event, &filter(&["APPROVED"])).await.unwrap();
    assert_eq!(approved.len(), 1);

    // No status filter hides deleted photos.
    let live = PhotoRepo::list(&pool, event, &filter(&[])).await.unwrap();
    assert_eq!(live.len(), 2);

    let deleted = PhotoRepo::list(&pool, event, &filter(&["DELETED"])).await.unwrap();
    assert_eq!(deleted.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_date_range_and_paging(pool: PgPool) {
    let event = setup_event(&pool).await;
    for seed in ['a', 'b', 'c'] {
        PhotoRepo::create(&pool, &new_photo(event, seed, "IMAGE", "APPROVED", 1))
            .await
            .unwrap();
    }
    let now = chrono::Utc::now();

    let mut f = filter(&["APPROVED"]);
    f.from = Some(now + chrono::Duration::minutes(1));
    assert!(PhotoRepo::list(&pool, event, &f).await.unwrap().is_empty());

    let mut f = filter(&["APPROVED"]);
    f.from = Some(now - chrono::Duration::hours(1));
    f.to = Some(now + chrono::Duration::hours(1));
    f.limit = 2;
    let page = PhotoRepo::list(&pool, event, &f).await.unwrap();
    assert_eq!(page.len(), 2);
    f.offset = 2;
    assert_eq!(PhotoRepo::list(&pool, event, &f).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transition_requires_expected_status(pool: PgPool) {
    let event = setup_event(&pool).await;
    let photo = PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "PENDING", 1))
        .await
        .unwrap();

    let stale = PhotoRepo::transition_status(&pool, event, photo.id, "APPROVED", "REJECTED")
        .await
        .unwrap();
    assert!(stale.is_none());

    let approved = PhotoRepo::transition_status(&pool, event, photo.id, "PENDING", "APPROVED")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, "APPROVED");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_skips_deleted_photos(pool: PgPool) {
    let event = setup_event(&pool).await;
    let photo = PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "APPROVED", 1))
        .await
        .unwrap();

    let fav = PhotoRepo::update(
        &pool,
        event,
        photo.id,
        &UpdatePhoto {
            is_favorite: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(fav.is_favorite);
    assert_eq!(fav.uploader_name.as_deref(), Some("Oma"));

    PhotoRepo::transition_status(&pool, event, photo.id, "APPROVED", "DELETED")
        .await
        .unwrap();
    let gone = PhotoRepo::update(&pool, event, photo.id, &UpdatePhoto::default())
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_usage_counts_and_stats(pool: PgPool) {
    let event = setup_event(&pool).await;
    PhotoRepo::create(&pool, &new_photo(event, 'a', "IMAGE", "APPROVED", 100)).await.unwrap();
    PhotoRepo::create(&pool, &new_photo(event, 'b', "IMAGE", "PENDING", 50)).await.unwrap();
    PhotoRepo::create(&pool, &new_photo(event, 'c', "VIDEO", "APPROVED", 1000)).await.unwrap();
    PhotoRepo::create(&pool, &new_photo(event, 'd', "IMAGE", "DELETED", 7)).await.unwrap();

    let usage = PhotoRepo::usage(&pool, event).await.unwrap();
    assert_eq!(usage.photos, 2);
    assert_eq!(usage.videos, 1);
    assert_eq!(usage.bytes, 1150);

    assert_eq!(PhotoRepo::count_for_guest(&pool, event, "guest-1").await.unwrap(), 3);
    assert_eq!(PhotoRepo::count_for_guest(&pool, event, "other").await.unwrap(), 0);

    let stats = PhotoRepo::stats(&pool, event).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.approved, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.images, 2);
    assert_eq!(stats.videos, 1);
    assert_eq!(stats.total_bytes, 1150);
}

//! Integration tests for mosaic walls and tiles.

use gaestefotos_core::mosaic::Cell;
use gaestefotos_core::roles::ROLE_HOST_ID;
use gaestefotos_db::models::event::CreateEvent;
use gaestefotos_db::models::mosaic::UpsertMosaicWall;
use gaestefotos_db::models::photo::CreatePhoto;
use gaestefotos_db::models::user::CreateUser;
use gaestefotos_db::repositories::{EventRepo, MosaicRepo, PhotoRepo, UserRepo};
use sqlx::PgPool;

async fn setup_event(pool: &PgPool) -> i64 {
    let host = UserRepo::create(
        pool,
        &CreateUser {
            email: "mosaic@example.com".to_string(),
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
        "wall",
        &CreateEvent {
            title: "Wall".to_string(),
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

async fn add_photo(pool: &PgPool, event_id: i64, seed: char, status: &str) -> i64 {
    PhotoRepo::create(
        pool,
        &CreatePhoto {
            event_id,
            category_id: None,
            media_kind: "IMAGE".to_string(),
            storage_path: format!("events/{event_id}/{seed}.jpg"),
            original_filename: None,
            mime_type: "image/jpeg".to_string(),
            size_bytes: 1,
            sha256: seed.to_string().repeat(64),
            uploader_name: None,
            guest_key: None,
            status: status.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn wall(columns: i32, rows: i32) -> UpsertMosaicWall {
    UpsertMosaicWall {
        grid_columns: columns,
        grid_rows: rows,
        tile_size_px: None,
        target_image_path: None,
        auto_fill: None,
        is_active: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_keeps_one_wall_per_event(pool: PgPool) {
    let event = setup_event(&pool).await;
    assert!(MosaicRepo::find_wall(&pool, event).await.unwrap().is_none());

    let created = MosaicRepo::upsert_wall(&pool, event, &wall(10, 8), 128).await.unwrap();
    assert_eq!(created.grid_columns, 10);
    assert!(!created.auto_fill);
    assert!(created.is_active);

    let mut input = wall(20, 12);
    input.auto_fill = Some(true);
    let updated = MosaicRepo::upsert_wall(&pool, event, &input, 64).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.grid_rows, 12);
    assert_eq!(updated.tile_size_px, 64);
    assert!(updated.auto_fill);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tile_uniqueness(pool: PgPool) {
    let event = setup_event(&pool).await;
    let wall = MosaicRepo::upsert_wall(&pool, event, &wall(4, 4), 128).await.unwrap();
    let p1 = add_photo(&pool, event, 'a', "APPROVED").await;
    let p2 = add_photo(&pool, event, 'b', "APPROVED").await;

    MosaicRepo::insert_tile(&pool, wall.id, p1, Cell { x: 0, y: 0 }).await.unwrap();

    let err = MosaicRepo::insert_tile(&pool, wall.id, p2, Cell { x: 0, y: 0 })
        .await
        .unwrap_err();
    assert_eq!(err.as_database_error().unwrap().constraint(), Some("uq_mosaic_tiles_cell"));

    let err = MosaicRepo::insert_tile(&pool, wall.id, p1, Cell { x: 1, y: 1 })
        .await
        .unwrap_err();
    assert_eq!(err.as_database_error().unwrap().constraint(), Some("uq_mosaic_tiles_photo"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unplaced_photos_and_bulk_insert(pool: PgPool) {
    let event = setup_event(&pool).await;
    let wall = MosaicRepo::upsert_wall(&pool, event, &wall(3, 3), 128).await.unwrap();
    let placed = add_photo(&pool, event, 'a', "APPROVED").await;
    let free1 = add_photo(&pool, event, 'b', "APPROVED").await;
    let free2 = add_photo(&pool, event, 'c', "APPROVED").await;
    add_photo(&pool, event, 'd', "PENDING").await;

    MosaicRepo::insert_tile(&pool, wall.id, placed, Cell { x: 1, y: 1 }).await.unwrap();

    let ids = MosaicRepo::unplaced_photo_ids(&pool, event, wall.id, 10).await.unwrap();
    assert_eq!(ids, vec![free1, free2]);

    let tiles = MosaicRepo::insert_tiles(
        &pool,
        wall.id,
        &[(free1, Cell { x: 0, y: 0 }), (free2, Cell { x: 2, y: 2 })],
    )
    .await
    .unwrap();
    assert_eq!(tiles.len(), 2);
    assert_eq!(MosaicRepo::list_tiles(&pool, wall.id).await.unwrap().len(), 3);
    assert!(MosaicRepo::unplaced_photo_ids(&pool, event, wall.id, 10)
        .await
        .unwrap()
        .is_empty());

    assert!(MosaicRepo::delete_tile(&pool, wall.id, tiles[0].id).await.unwrap());
    assert!(!MosaicRepo::delete_tile(&pool, wall.id, tiles[0].id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_insert_is_atomic(pool: PgPool) {
    let event = setup_event(&pool).await;
    let wall = MosaicRepo::upsert_wall(&pool, event, &wall(3, 3), 128).await.unwrap();
    let p1 = add_photo(&pool, event, 'a', "APPROVED").await;
    let p2 = add_photo(&pool, event, 'b', "APPROVED").await;

    let result = MosaicRepo::insert_tiles(
        &pool,
        wall.id,
        &[(p1, Cell { x: 0, y: 0 }), (p2, Cell { x: 0, y: 0 })],
    )
    .await;
    assert!(result.is_err());
    assert!(MosaicRepo::list_tiles(&pool, wall.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_leaving_approved_removes_tile(pool: PgPool) {
    let event = setup_event(&pool).await;
    let wall = MosaicRepo::upsert_wall(&pool, event, &wall(3, 3), 128).await.unwrap();
    let rejected = add_photo(&pool, event, 'a', "APPROVED").await;
    let kept = add_photo(&pool, event, 'b', "APPROVED").await;
    MosaicRepo::insert_tile(&pool, wall.id, rejected, Cell { x: 0, y: 0 }).await.unwrap();
    MosaicRepo::insert_tile(&pool, wall.id, kept, Cell { x: 1, y: 1 }).await.unwrap();

    let photo = PhotoRepo::transition_status(&pool, event, rejected, "APPROVED", "REJECTED")
        .await
        .unwrap();
    assert!(photo.is_some());

    let tiles = MosaicRepo::list_tiles(&pool, wall.id).await.unwrap();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].photo_id, kept);

    // A stale transition changes nothing.
    let stale = PhotoRepo::transition_status(&pool, event, kept, "PENDING", "DELETED")
        .await
        .unwrap();
    assert!(stale.is_none());
    assert_eq!(MosaicRepo::list_tiles(&pool, wall.id).await.unwrap().len(), 1);
}

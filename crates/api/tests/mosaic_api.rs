//! HTTP-level tests for the mosaic wall.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_event, delete_auth, get, get_auth, post_json_auth, put_json_auth, upload};
use serde_json::json;
use sqlx::PgPool;

struct MosaicEvent {
    id: i64,
    slug: String,
    host: String,
}

async fn mosaic_event(pool: &PgPool) -> MosaicEvent {
    common::set_flag_default(pool, "mosaic_wall", true).await;
    let host = common::host_token(pool, "host@example.com").await;
    let event = create_event(
        pool,
        &host,
        json!({ "title": "Mosaik", "feature_config": { "mosaic_enabled": true } }),
    )
    .await;
    MosaicEvent {
        id: event["id"].as_i64().unwrap(),
        slug: event["slug"].as_str().unwrap().to_string(),
        host,
    }
}

async fn upload_image(pool: &PgPool, slug: &str, n: u8) -> i64 {
    let data = [0xFF, 0xD8, n];
    let app = common::build_test_app(pool.clone());
    let response = upload(app, slug, &format!("{n}.jpg"), "image/jpeg", &data, &[]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn configure(pool: &PgPool, ev: &MosaicEvent, body: serde_json::Value) -> axum::http::Response<axum::body::Body> {
    let app = common::build_test_app(pool.clone());
    put_json_auth(app, &format!("/api/v1/events/{}/mosaic", ev.id), body, &ev.host).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn mosaic_requires_feature(pool: PgPool) {
    let host = common::host_token(&pool, "host@example.com").await;
    let event = create_event(&pool, &host, json!({ "title": "Ohne Mosaik" })).await;
    let id = event["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/events/{id}/mosaic"),
        json!({ "grid_columns": 4, "grid_rows": 4 }),
        &host,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tiles_fill_the_wall_without_overlap(pool: PgPool) {
    let ev = mosaic_event(&pool).await;
    let response = configure(&pool, &ev, json!({ "grid_columns": 2, "grid_rows": 2 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["capacity"], 4);

    let first = upload_image(&pool, &ev.slug, 1).await;
    let second = upload_image(&pool, &ev.slug, 2).await;

    let tiles_uri = format!("/api/v1/events/{}/mosaic/tiles", ev.id);
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &tiles_uri, json!({ "photo_id": first, "cell_x": 0, "cell_y": 0 }), &ev.host).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same cell again.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &tiles_uri, json!({ "photo_id": second, "cell_x": 0, "cell_y": 0 }), &ev.host).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Outside the grid.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &tiles_uri, json!({ "photo_id": second, "cell_x": 5, "cell_y": 0 }), &ev.host).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &tiles_uri, json!({ "photo_id": second }), &ev.host).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tile = body_json(response).await["data"].clone();
    assert!(!(tile["cell_x"] == 0 && tile["cell_y"] == 0));

    let app = common::build_test_app(pool.clone());
    let public = body_json(get(app, &format!("/api/v1/public/events/{}/mosaic", ev.slug)).await).await;
    assert_eq!(public["data"]["filled"], 2);
    assert_eq!(public["data"]["fill_ratio"], 0.5);

    // Shrinking below a placed tile is refused.
    let response = configure(&pool, &ev, json!({ "grid_columns": 1, "grid_rows": 1 })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let tile_id = tile["id"].as_i64().unwrap();
    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/events/{}/mosaic/tiles/{tile_id}", ev.id), &ev.host).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn auto_fill_places_unplaced_photos(pool: PgPool) {
    let ev = mosaic_event(&pool).await;
    for n in 1..=3 {
        upload_image(&pool, &ev.slug, n).await;
    }
    configure(&pool, &ev, json!({ "grid_columns": 3, "grid_rows": 1 })).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &format!("/api/v1/events/{}/mosaic/auto-fill", ev.id), json!({}), &ev.host).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &format!("/api/v1/events/{}/mosaic/auto-fill", ev.id), json!({}), &ev.host).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let wall = body_json(get_auth(app, &format!("/api/v1/events/{}/mosaic", ev.id), &ev.host).await).await;
    assert_eq!(wall["data"]["fill_ratio"], 1.0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approved_uploads_join_auto_fill_walls(pool: PgPool) {
    let ev = mosaic_event(&pool).await;
    configure(&pool, &ev, json!({ "grid_columns": 2, "grid_rows": 2, "auto_fill": true })).await;

    upload_image(&pool, &ev.slug, 9).await;

    let app = common::build_test_app(pool);
    let wall = body_json(get_auth(app, &format!("/api/v1/events/{}/mosaic", ev.id), &ev.host).await).await;
    assert_eq!(wall["data"]["filled"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejected_and_deleted_photos_leave_the_wall(pool: PgPool) {
    let ev = mosaic_event(&pool).await;
    configure(&pool, &ev, json!({ "grid_columns": 2, "grid_rows": 2, "auto_fill": true })).await;

    let rejected = upload_image(&pool, &ev.slug, 1).await;
    let deleted = upload_image(&pool, &ev.slug, 2).await;
    let public_uri = format!("/api/v1/public/events/{}/mosaic", ev.slug);

    let app = common::build_test_app(pool.clone());
    let public = body_json(get(app, &public_uri).await).await;
    assert_eq!(public["data"]["filled"], 2);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/events/{}/photos/{rejected}/moderate", ev.id),
        json!({ "status": "REJECTED" }),
        &ev.host,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/events/{}/photos/{deleted}", ev.id), &ev.host).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let public = body_json(get(app, &public_uri).await).await;
    assert_eq!(public["data"]["filled"], 0);
    assert!(public["data"]["tiles"].as_array().unwrap().is_empty());
}

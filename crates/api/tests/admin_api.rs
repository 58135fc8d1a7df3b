//! HTTP-level tests for packages, feature flags, invoices and workflows.

mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use common::{
    body_json, create_event, delete_auth, get, get_auth, post_json_auth, put_json_auth, upload,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn package_quota_blocks_uploads(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let host = common::host_token(&pool, "host@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/packages",
        json!({ "code": "mini", "name": "Mini", "price_cents": 1900, "max_photos": 1, "features": [] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let package_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let event = create_event(&pool, &host, json!({ "title": "Klein", "package_id": package_id })).await;
    let slug = event["slug"].as_str().unwrap();

    let first = upload(common::build_test_app(pool.clone()), slug, "a.jpg", "image/jpeg", b"\xFF\xD8one", &[]).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = upload(common::build_test_app(pool.clone()), slug, "b.jpg", "image/jpeg", b"\xFF\xD8two", &[]).await;
    assert_eq!(second.status(), StatusCode::FORBIDDEN);

    let public = body_json(get(common::build_test_app(pool), "/api/v1/public/packages").await).await;
    assert_eq!(public["data"][0]["code"], "mini");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn package_with_unknown_feature_is_rejected(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/packages",
        json!({ "code": "gold", "name": "Gold", "price_cents": 9900, "features": ["time_travel"] }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Feature flags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn event_override_beats_global_default(pool: PgPool) {
    let host = common::host_token(&pool, "host@example.com").await;
    let event = create_event(&pool, &host, json!({ "title": "Flags" })).await;
    let id = event["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/events/{id}/feature-flags/video_uploads"),
        json!({ "enabled": false }),
        &host,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let flags = body_json(get_auth(app, &format!("/api/v1/events/{id}/feature-flags"), &host).await).await;
    let video = flags["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["key"] == "video_uploads")
        .unwrap()
        .clone();
    assert_eq!(video["enabled"], false);

    // Videos are now refused even though the default allows them.
    let app = common::build_test_app(pool.clone());
    let slug = event["slug"].as_str().unwrap();
    let response = upload(app, slug, "clip.mp4", "video/mp4", b"\x00\x00\x00\x18ftypmp42", &[]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/events/{id}/feature-flags/no_such_flag"),
        json!({ "enabled": true }),
        &host,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_manages_flags(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/feature-flags",
        json!({ "key": "live_slideshow", "default_enabled": false }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/feature-flags",
        json!({ "key": "Not A Key", "default_enabled": false }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, "/api/v1/admin/feature-flags/live_slideshow", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn invoice_numbers_and_totals(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let host_user =
        common::create_user(&pool, "host@example.com", gaestefotos_core::roles::ROLE_HOST_ID).await;
    let host = common::login(common::build_test_app(pool.clone()), "host@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/invoices",
        json!({ "user_id": host_user.id, "net_cents": 4990 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invoice = body_json(response).await["data"].clone();
    assert_eq!(invoice["vat_cents"], 948);
    assert_eq!(invoice["gross_cents"], 5938);
    assert_eq!(invoice["status"], "DRAFT");
    let year = Utc::now().year();
    assert!(invoice["invoice_number"]
        .as_str()
        .unwrap()
        .starts_with(&format!("GF-{year}-")));

    let id = invoice["id"].as_i64().unwrap();
    let status_uri = format!("/api/v1/admin/invoices/{id}/status");

    // DRAFT cannot jump to PAID.
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &status_uri, json!({ "status": "PAID" }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &status_uri, json!({ "status": "ISSUED" }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let mine = body_json(get_auth(app, "/api/v1/invoices", &host).await).await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invoice_needs_amount_without_package(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let host_user =
        common::create_user(&pool, "host@example.com", gaestefotos_core::roles::ROLE_HOST_ID).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/invoices",
        json!({ "user_id": host_user.id }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn oversized_invoice_amount_is_rejected(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let host_user =
        common::create_user(&pool, "host@example.com", gaestefotos_core::roles::ROLE_HOST_ID).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/invoices",
        json!({ "user_id": host_user.id, "net_cents": 5_000_000_000_000_000_i64 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool);
    let list = body_json(get_auth(app, "/api/v1/admin/invoices", &admin).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn default_workflow_is_walkable(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/workflows/by-type/guestbook").await;
    assert_eq!(response.status(), StatusCode::OK);
    let workflow = body_json(response).await["data"].clone();
    assert_eq!(workflow["flow_type"], "GUESTBOOK");
    let id = workflow["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let start = body_json(get(app, &format!("/api/v1/workflows/{id}/next")).await).await;
    assert_eq!(start["data"][0]["node"]["kind"], "START");

    let app = common::build_test_app(pool.clone());
    let next = body_json(get(app, &format!("/api/v1/workflows/{id}/next?from=start")).await).await;
    assert_eq!(next["data"][0]["node"]["id"], "form");

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/workflows/{id}/next?from=nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn default_workflow_cannot_be_deleted(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let app = common::build_test_app(pool.clone());
    let workflow = body_json(get(app, "/api/v1/workflows/by-type/UPLOAD").await).await;
    let id = workflow["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/admin/workflows/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn workflow_graph_is_validated(pool: PgPool) {
    let admin = common::admin_token(&pool, "admin@example.com").await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/workflows",
        json!({
            "name": "Broken",
            "flow_type": "UPLOAD",
            "nodes": [{ "id": "start", "kind": "START" }],
            "edges": [{ "from": "start", "to": "missing" }],
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

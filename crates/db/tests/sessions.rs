//! Integration tests for refresh-token sessions.

use chrono::{Duration, Utc};
use gaestefotos_core::roles::ROLE_HOST_ID;
use gaestefotos_db::models::session::CreateSession;
use gaestefotos_db::models::user::CreateUser;
use gaestefotos_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

async fn new_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "session@example.com".to_string(),
            password_hash: "x".to_string(),
            display_name: "Session".to_string(),
            role_id: ROLE_HOST_ID,
        },
    )
    .await
    .unwrap()
    .id
}

async fn open_session(pool: &PgPool, user_id: i64, hash: &str, valid_for: Duration) {
    SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            refresh_token_hash: hash.to_string(),
            expires_at: Utc::now() + valid_for,
            user_agent: None,
            ip_address: Some("192.0.2.1".to_string()),
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_token_is_single_use(pool: PgPool) {
    let user = new_user(&pool).await;
    open_session(&pool, user, "live", Duration::days(7)).await;
    open_session(&pool, user, "expired", Duration::hours(-1)).await;

    let session = SessionRepo::consume_refresh_token(&pool, "live").await.unwrap();
    assert_eq!(session.map(|s| (s.user_id, s.is_revoked)), Some((user, true)));

    assert!(SessionRepo::consume_refresh_token(&pool, "live").await.unwrap().is_none());
    assert!(SessionRepo::consume_refresh_token(&pool, "expired").await.unwrap().is_none());
    assert!(SessionRepo::consume_refresh_token(&pool, "unknown").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_purge_runs_in_batches_and_keeps_live_sessions(pool: PgPool) {
    let user = new_user(&pool).await;
    open_session(&pool, user, "live", Duration::days(7)).await;
    for n in 0..3 {
        open_session(&pool, user, &format!("expired-{n}"), Duration::hours(-1)).await;
    }
    open_session(&pool, user, "used", Duration::days(7)).await;
    SessionRepo::consume_refresh_token(&pool, "used").await.unwrap();

    assert_eq!(SessionRepo::purge_stale(&pool, 2).await.unwrap(), 4);
    assert_eq!(SessionRepo::purge_stale(&pool, 2).await.unwrap(), 0);

    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user).await.unwrap(), 1);
}

//! Integration tests for the drawbot / spinner job queues.
//!
//! - Queue positions are COUNT-based and ordered by creation then id
//! - Claiming hands out the oldest queued job and skips locked rows
//! - Transitions only apply from the expected status
//! - The two booth tables are independent

use gaestefotos_core::booth::{BoothJobStatus, BoothKind};
use gaestefotos_core::roles::ROLE_HOST_ID;
use gaestefotos_db::models::booth_job::EnqueueBoothJob;
use gaestefotos_db::models::event::CreateEvent;
use gaestefotos_db::models::user::CreateUser;
use gaestefotos_db::repositories::{BoothJobRepo, EventRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn setup_events(pool: &PgPool) -> (i64, i64) {
    let host = UserRepo::create(
        pool,
        &CreateUser {
            email: "booth@example.com".to_string(),
            password_hash: "x".to_string(),
            display_name: "Host".to_string(),
            role_id: ROLE_HOST_ID,
        },
    )
    .await
    .unwrap();
    let mut ids = Vec::new();
    for slug in ["booth-one", "booth-two"] {
        let event = EventRepo::create(
            pool,
            host.id,
            slug,
            &CreateEvent {
                title: slug.to_string(),
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
        .unwrap();
        ids.push(event.id);
    }
    (ids[0], ids[1])
}

fn job(name: &str) -> EnqueueBoothJob {
    EnqueueBoothJob {
        photo_id: None,
        guest_name: Some(name.to_string()),
        payload: Some(serde_json::json!({"style": "sketch"})),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_positions_follow_enqueue_order(pool: PgPool) {
    let (event, other) = setup_events(&pool).await;
    let kind = BoothKind::Drawbot;

    let a = BoothJobRepo::enqueue(&pool, kind, event, &job("a")).await.unwrap();
    let b = BoothJobRepo::enqueue(&pool, kind, event, &job("b")).await.unwrap();
    let elsewhere = BoothJobRepo::enqueue(&pool, kind, other, &job("x")).await.unwrap();
    let c = BoothJobRepo::enqueue(&pool, kind, event, &job("c")).await.unwrap();

    assert_eq!(a.status, "QUEUED");
    assert_eq!(a.payload["style"], "sketch");
    assert_eq!(BoothJobRepo::position(&pool, kind, &a).await.unwrap(), Some(1));
    assert_eq!(BoothJobRepo::position(&pool, kind, &b).await.unwrap(), Some(2));
    assert_eq!(BoothJobRepo::position(&pool, kind, &c).await.unwrap(), Some(3));
    assert_eq!(BoothJobRepo::position(&pool, kind, &elsewhere).await.unwrap(), Some(1));

    // Cancelling the head moves everyone up.
    BoothJobRepo::transition(&pool, kind, a.id, BoothJobStatus::Queued, BoothJobStatus::Cancelled, None)
        .await
        .unwrap()
        .unwrap();
    let c = BoothJobRepo::find_with_position(&pool, kind, c.id).await.unwrap().unwrap();
    assert_eq!(c.position, Some(2));
    let a = BoothJobRepo::find_with_position(&pool, kind, a.id).await.unwrap().unwrap();
    assert_eq!(a.position, None);
    assert!(a.job.finished_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_claim_next_takes_oldest_for_event(pool: PgPool) {
    let (event, other) = setup_events(&pool).await;
    let kind = BoothKind::Spinner;

    let first = BoothJobRepo::enqueue(&pool, kind, event, &job("first")).await.unwrap();
    let second = BoothJobRepo::enqueue(&pool, kind, event, &job("second")).await.unwrap();
    BoothJobRepo::enqueue(&pool, kind, other, &job("other")).await.unwrap();

    let claimed = BoothJobRepo::claim_next(&pool, kind, Some(event), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.id, first.id);
    assert_eq!(claimed.status, "PROCESSING");
    assert!(claimed.started_at.is_some());

    let claimed = BoothJobRepo::claim_next(&pool, kind, Some(event), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.id, second.id);

    assert!(BoothJobRepo::claim_next(&pool, kind, Some(event), None)
        .await
        .unwrap()
        .is_none());

    // Unrestricted claim reaches other events.
    let any = BoothJobRepo::claim_next(&pool, kind, None, None).await.unwrap().unwrap();
    assert_eq!(any.event_id, other);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transition_and_queue_listing(pool: PgPool) {
    let (event, _) = setup_events(&pool).await;
    let kind = BoothKind::Drawbot;

    let a = BoothJobRepo::enqueue(&pool, kind, event, &job("a")).await.unwrap();
    BoothJobRepo::enqueue(&pool, kind, event, &job("b")).await.unwrap();
    BoothJobRepo::enqueue(&pool, kind, event, &job("c")).await.unwrap();
    BoothJobRepo::claim_next(&pool, kind, Some(event), None).await.unwrap();

    let queue = BoothJobRepo::list_queue(&pool, kind, event).await.unwrap();
    assert_eq!(queue.len(), 3);
    assert_eq!(queue[0].job.id, a.id);
    assert_eq!(queue[0].position, None);
    assert_eq!(queue[1].position, Some(1));
    assert_eq!(queue[2].position, Some(2));

    // Stale transition is rejected.
    let stale = BoothJobRepo::transition(&pool, kind, a.id, BoothJobStatus::Queued, BoothJobStatus::Processing, None)
        .await
        .unwrap();
    assert!(stale.is_none());

    let failed = BoothJobRepo::transition(
        &pool,
        kind,
        a.id,
        BoothJobStatus::Processing,
        BoothJobStatus::Failed,
        Some("pen jammed"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(failed.status, "FAILED");
    assert_eq!(failed.error_message.as_deref(), Some("pen jammed"));
    assert!(failed.finished_at.is_some());

    let counts = BoothJobRepo::counts(&pool, kind).await.unwrap();
    assert_eq!(counts.queued, 2);
    assert_eq!(counts.processing, 0);
    assert_eq!(counts.failed, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_booth_tables_are_independent(pool: PgPool) {
    let (event, _) = setup_events(&pool).await;
    let drawbot = BoothJobRepo::enqueue(&pool, BoothKind::Drawbot, event, &job("d")).await.unwrap();

    assert!(BoothJobRepo::find_by_id(&pool, BoothKind::Spinner, drawbot.id)
        .await
        .unwrap()
        .is_none());
    assert!(BoothJobRepo::claim_next(&pool, BoothKind::Spinner, Some(event), None)
        .await
        .unwrap()
        .is_none());
    assert_eq!(BoothJobRepo::counts(&pool, BoothKind::Drawbot).await.unwrap().queued, 1);
}

//! End-to-end scenarios against a real Postgres instance, mirroring the
//! literal values used to seed the suite.
//!
//! Requires `TEST_DATABASE_URL` to point at a scratch database; each test
//! creates its own detection and risk object so tests do not interfere with
//! each other even though they share a schema.

use risk_core::config::{Config, DatabaseConfig, LimitsConfig, ScoringConfig};
use risk_engine::ingestion::{EventInput, RiskObjectRef};
use risk_engine::model::{AlertStatus, EntityKind};
use risk_engine::{RiskEngine, RiskError};

struct TestContext {
    engine: RiskEngine,
}

impl TestContext {
    async fn new(alert_threshold: i64) -> Self {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set to run scoring scenario tests");

        let config = Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
                min_connections: 1,
            },
            scoring: ScoringConfig {
                alert_threshold,
                decay_factor: 0.9,
                decay_interval_secs: 3600,
                efficacy_window_days: 30,
            },
            limits: LimitsConfig {
                max_raw_data_bytes: 10240,
                max_context_bytes: 10240,
            },
        };

        let engine = RiskEngine::connect(config).await.expect("connect");
        Self { engine }
    }

    /// Creates a detection row directly; the detection CRUD subsystem is
    /// external to this core, so tests poke the table the way that
    /// subsystem would.
    async fn seed_detection(&self) -> i64 {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO detections (name, stage, severity, default_points) \
             VALUES ($1, 'production', 'high', 0) RETURNING id",
        )
        .bind(format!("test-detection-{}", uuid::Uuid::new_v4()))
        .fetch_one(self.engine.store().pool())
        .await
        .expect("seed detection");
        row.0
    }

    fn event(
        &self,
        detection_id: i64,
        kind: EntityKind,
        value: &str,
        points: i64,
    ) -> EventInput {
        EventInput {
            detection_id,
            entity_id: None,
            risk_object: Some(RiskObjectRef {
                entity_type: kind,
                entity_value: value.to_string(),
            }),
            timestamp: None,
            raw_data: None,
            context: None,
            risk_points: points,
            is_false_positive: false,
        }
    }
}

#[tokio::test]
async fn s1_single_crossing_opens_one_alert() {
    let ctx = TestContext::new(75).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("workstation-{}", uuid::Uuid::new_v4());

    let first = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 35))
        .await
        .expect("first event");
    assert!(first.alert.is_none());

    let second = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 45))
        .await
        .expect("second event");

    let alert = second.alert.expect("alert should open at score 80");
    assert_eq!(alert.total_score, 80);
    assert_eq!(alert.status, AlertStatus::New);
}

#[tokio::test]
async fn s2_debounce_keeps_single_alert() {
    let ctx = TestContext::new(75).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("workstation-{}", uuid::Uuid::new_v4());

    ctx.engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 35))
        .await
        .unwrap();
    let opened = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 45))
        .await
        .unwrap();
    let alert_id = opened.alert.unwrap().id;

    let third = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 20))
        .await
        .unwrap();
    assert!(third.alert.is_none(), "debounce must suppress a second alert");

    let alert = ctx.engine.get_alert(alert_id).await.unwrap();
    assert_eq!(alert.total_score, 80, "existing alert is never mutated");

    let objects = ctx.engine.list_risk_objects(None).await.unwrap();
    let obj = objects.iter().find(|o| o.value == value).unwrap();
    assert_eq!(obj.current_score, 100);
}

#[tokio::test]
async fn s3_false_positive_reversal() {
    let ctx = TestContext::new(75).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("user-{}", uuid::Uuid::new_v4());

    let mut event_ids = Vec::new();
    for _ in 0..5 {
        let outcome = ctx
            .engine
            .append_event(&ctx.event(detection_id, EntityKind::User, &value, 20))
            .await
            .unwrap();
        event_ids.push(outcome.event.id);
    }

    ctx.engine
        .mark_false_positive(event_ids[1], "analyst-1", "noise")
        .await
        .unwrap();
    ctx.engine
        .mark_false_positive(event_ids[3], "analyst-1", "noise")
        .await
        .unwrap();

    let objects = ctx.engine.list_risk_objects(None).await.unwrap();
    let obj = objects.iter().find(|o| o.value == value).unwrap();
    assert_eq!(obj.current_score, 60);

    let efficacy = ctx.engine.efficacy(detection_id).await.unwrap();
    assert!((efficacy.lifetime_fp_rate - 0.4).abs() < 1e-9);
}

#[tokio::test]
async fn s4_decay_does_not_close_open_alert() {
    let ctx = TestContext::new(75).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("host-{}", uuid::Uuid::new_v4());

    let outcome = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 90))
        .await
        .unwrap();
    let alert_id = outcome.alert.expect("alert opens at 90").id;

    risk_engine::score::decay_all(ctx.engine.store().pool(), 0.9)
        .await
        .unwrap();

    let objects = ctx.engine.list_risk_objects(None).await.unwrap();
    let obj = objects.iter().find(|o| o.value == value).unwrap();
    assert_eq!(obj.current_score, 81);

    let alert = ctx.engine.get_alert(alert_id).await.unwrap();
    assert_ne!(alert.status, AlertStatus::Closed);
}

#[tokio::test]
async fn s5_close_and_reopen() {
    let ctx = TestContext::new(75).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("host-{}", uuid::Uuid::new_v4());

    let first = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 90))
        .await
        .unwrap();
    let first_alert = first.alert.unwrap();

    ctx.engine
        .transition_alert(first_alert.id, AlertStatus::Closed, None, None)
        .await
        .unwrap();

    let second = ctx
        .engine
        .append_event(&ctx.event(detection_id, EntityKind::Host, &value, 80))
        .await
        .unwrap();
    let second_alert = second.alert.expect("closing must allow a fresh promotion");

    assert_ne!(second_alert.id, first_alert.id);
    assert_eq!(second_alert.total_score, 170);
}

#[tokio::test]
async fn s6_contributing_event_reconstruction() {
    let ctx = TestContext::new(50).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("user-{}", uuid::Uuid::new_v4());

    let base = chrono::Utc::now();
    let mut e1 = ctx.event(detection_id, EntityKind::User, &value, 20);
    e1.timestamp = Some(base);
    let mut e2 = ctx.event(detection_id, EntityKind::User, &value, 15);
    e2.timestamp = Some(base + chrono::Duration::seconds(1));
    let mut e3 = ctx.event(detection_id, EntityKind::User, &value, 20);
    e3.timestamp = Some(base + chrono::Duration::seconds(2));

    ctx.engine.append_event(&e1).await.unwrap();
    let outcome2 = ctx.engine.append_event(&e2).await.unwrap();
    assert!(outcome2.alert.is_none());
    let outcome3 = ctx.engine.append_event(&e3).await.unwrap();
    let alert = outcome3.alert.expect("alert opens at e3");

    let contributing = ctx.engine.contributing_events(alert.id).await.unwrap();
    assert_eq!(contributing.len(), 3);

    let e2_id = contributing[1].id;
    ctx.engine
        .mark_false_positive(e2_id, "analyst-1", "noise")
        .await
        .unwrap();

    let contributing_after = ctx.engine.contributing_events(alert.id).await.unwrap();
    assert_eq!(contributing_after.len(), 2);

    let objects = ctx.engine.list_risk_objects(None).await.unwrap();
    let obj = objects.iter().find(|o| o.value == value).unwrap();
    assert_eq!(obj.current_score, 40);
}

#[tokio::test]
async fn batch_rejects_with_no_partial_commit() {
    let ctx = TestContext::new(75).await;
    let detection_id = ctx.seed_detection().await;
    let value = format!("host-{}", uuid::Uuid::new_v4());

    let mut bad = ctx.event(detection_id, EntityKind::Host, &value, 30);
    bad.risk_points = -1;

    let inputs = vec![
        ctx.event(detection_id, EntityKind::Host, &value, 40),
        ctx.event(detection_id, EntityKind::Host, &value, 40),
        bad,
    ];

    let err = ctx
        .engine
        .append_events(&inputs)
        .await
        .expect_err("batch must fail on the third item");

    match err {
        RiskError::BatchValidation { index, .. } => assert_eq!(index, 2),
        other => panic!("expected BatchValidation, got {other:?}"),
    }

    let objects = ctx.engine.list_risk_objects(None).await.unwrap();
    assert!(
        objects.iter().all(|o| o.value != value),
        "no risk object should have been created by a rolled-back batch"
    );
}

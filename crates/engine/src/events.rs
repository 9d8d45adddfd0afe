//! Event Log (spec §4.3): append-only detection firings, with controlled
//! mutation of `is_false_positive`.

use crate::alerts;
use crate::error::{Result, RiskError};
use crate::ingestion::{EventInput, Target};
use crate::model::{Event, FalsePositiveRecord, RiskAlert};
use crate::registry;
use crate::score;
use crate::store::Store;
use chrono::Utc;
use risk_core::config::{LimitsConfig, ScoringConfig};
use risk_core::Error;
use sqlx::Row;
use tracing::info;

/// Outcome of appending a single event: the stored event plus an alert if
/// this append happened to be the promotion event.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub event: Event,
    pub alert: Option<RiskAlert>,
}

/// Appends one event per the five-step contract in spec §4.3: resolve the
/// target, insert the row, conditionally hand off to the Score Accumulator
/// and Alert Promoter, all inside one transaction.
pub async fn append(
    store: &Store,
    input: &EventInput,
    limits: &LimitsConfig,
    scoring: &ScoringConfig,
) -> Result<AppendOutcome> {
    let mut tx = store.pool().begin().await.map_err(Error::from)?;
    let outcome = append_in_tx(&mut tx, input, limits, scoring).await?;
    tx.commit().await.map_err(Error::from)?;
    Ok(outcome)
}

/// Processes `inputs` as an ordered sequence within a single transaction: if
/// any event fails validation or a storage check, nothing from the batch is
/// committed and the error identifies the offending index (spec §4.3,
/// "partial success is not offered"). Driven through one `Transaction` that
/// `append_batch` owns end to end, rather than one transaction per item.
pub async fn append_batch(
    store: &Store,
    inputs: &[EventInput],
    limits: &LimitsConfig,
    scoring: &ScoringConfig,
) -> Result<Vec<AppendOutcome>> {
    let mut tx = store.pool().begin().await.map_err(Error::from)?;
    let mut outcomes = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        match append_in_tx(&mut tx, input, limits, scoring).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                tx.rollback().await.map_err(Error::from)?;
                return Err(RiskError::BatchValidation {
                    index,
                    source: Box::new(e),
                });
            }
        }
    }

    tx.commit().await.map_err(Error::from)?;
    Ok(outcomes)
}

/// Core append logic shared by [`append`] and [`append_batch`], driven
/// against a transaction the caller owns the lifetime of.
async fn append_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    input: &EventInput,
    limits: &LimitsConfig,
    scoring: &ScoringConfig,
) -> Result<AppendOutcome> {
    let target = input.validate(limits)?;

    if !detection_exists(tx, input.detection_id).await? {
        return Err(RiskError::Core(Error::invalid_input(format!(
            "unknown detection reference: {}",
            input.detection_id
        ))));
    }

    let entity_id = match target {
        Target::ExistingId(id) => {
            if !registry::exists(tx, id).await? {
                return Err(RiskError::RiskObjectNotFound { id });
            }
            id
        }
        Target::ByNaturalKey(obj) => {
            let (id, _created) = registry::resolve(tx, obj.entity_type, &obj.entity_value).await?;
            id
        }
    };

    let timestamp = input.timestamp.unwrap_or_else(Utc::now);

    let row = sqlx::query(
        "INSERT INTO events (detection_id, entity_id, \"timestamp\", raw_data, context, points, is_false_positive) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(input.detection_id)
    .bind(entity_id)
    .bind(timestamp)
    .bind(&input.raw_data)
    .bind(&input.context)
    .bind(input.risk_points)
    .bind(input.is_false_positive)
    .fetch_one(&mut **tx)
    .await
    .map_err(Error::from)?;

    let event_id: i64 = row.try_get("id").map_err(Error::from)?;

    let mut alert = None;
    if !input.is_false_positive && input.risk_points > 0 {
        let post_score = score::add(tx, entity_id, input.risk_points).await?;
        alert = alerts::maybe_promote(tx, entity_id, post_score, scoring.alert_threshold).await?;
    }

    info!(event_id, entity_id, detection_id = input.detection_id, "event appended");

    Ok(AppendOutcome {
        event: Event {
            id: event_id,
            detection_id: input.detection_id,
            entity_id,
            timestamp,
            raw_data: input.raw_data.clone(),
            context: input.context.clone(),
            points: input.risk_points,
            is_false_positive: input.is_false_positive,
        },
        alert,
    })
}

/// Flips an event's false-positive flag (idempotent), records the reversal,
/// and subtracts the event's original points from the owning object's
/// score, clamped at 0 (spec §4.3).
pub async fn mark_false_positive(
    store: &Store,
    event_id: i64,
    analyst: &str,
    reason: &str,
) -> Result<Option<FalsePositiveRecord>> {
    let mut tx = store.pool().begin().await.map_err(Error::from)?;

    let row: Option<(i64, i64, bool)> =
        sqlx::query_as("SELECT entity_id, points, is_false_positive FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::from)?;

    let (entity_id, points, already_fp) = row.ok_or(RiskError::EventNotFound { id: event_id })?;

    if already_fp {
        tx.commit().await.map_err(Error::from)?;
        return Ok(None);
    }

    sqlx::query("UPDATE events SET is_false_positive = true WHERE id = $1")
        .bind(event_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::from)?;

    let fp_row = sqlx::query(
        "INSERT INTO false_positives (event_id, analyst, reason, \"timestamp\") \
         VALUES ($1, $2, $3, now()) \
         RETURNING id, \"timestamp\"",
    )
    .bind(event_id)
    .bind(analyst)
    .bind(reason)
    .fetch_one(&mut *tx)
    .await
    .map_err(Error::from)?;

    let fp_id: i64 = fp_row.try_get("id").map_err(Error::from)?;
    let fp_timestamp: chrono::DateTime<Utc> = fp_row.try_get("timestamp").map_err(Error::from)?;

    if points > 0 {
        score::subtract(&mut tx, entity_id, points).await?;
    }

    tx.commit().await.map_err(Error::from)?;

    info!(event_id, entity_id, points, "event marked false positive");

    Ok(Some(FalsePositiveRecord {
        id: fp_id,
        event_id,
        analyst: analyst.to_string(),
        reason: reason.to_string(),
        timestamp: fp_timestamp,
    }))
}

async fn detection_exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    detection_id: i64,
) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM detections WHERE id = $1")
        .bind(detection_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::from)?;
    Ok(row.is_some())
}

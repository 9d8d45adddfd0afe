//! Efficacy Metrics (spec §4.8): pure reads over the event log, no caching.

use crate::error::Result;
use chrono::Duration;
use risk_core::Error;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EfficacySummary {
    pub window_event_count: i64,
    pub window_fp_count: i64,
    pub lifetime_fp_rate: f64,
}

/// Computes the 30-day event count, 30-day false-positive count, and
/// lifetime false-positive rate for a detection. The rate is 0 when the
/// detection has no events (spec §4.8, invariant 8).
pub async fn summarize(pool: &PgPool, detection_id: i64, window_days: i64) -> Result<EfficacySummary> {
    let cutoff = chrono::Utc::now() - Duration::days(window_days);

    let (window_event_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM events WHERE detection_id = $1 AND \"timestamp\" >= $2",
    )
    .bind(detection_id)
    .bind(cutoff)
    .fetch_one(pool)
    .await
    .map_err(Error::from)?;

    let (window_fp_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM events \
         WHERE detection_id = $1 AND \"timestamp\" >= $2 AND is_false_positive = true",
    )
    .bind(detection_id)
    .bind(cutoff)
    .fetch_one(pool)
    .await
    .map_err(Error::from)?;

    let (total_count, fp_count): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_false_positive = true) \
         FROM events WHERE detection_id = $1",
    )
    .bind(detection_id)
    .fetch_one(pool)
    .await
    .map_err(Error::from)?;

    let lifetime_fp_rate = if total_count == 0 {
        0.0
    } else {
        fp_count as f64 / total_count as f64
    };

    Ok(EfficacySummary {
        window_event_count,
        window_fp_count,
        lifetime_fp_rate,
    })
}

//! Contributing-Event Projection (spec §4.6): computed on demand, never
//! stored, so that flipping an event's FP flag never requires rewriting an
//! alert.

use crate::error::Result;
use crate::model::Event;
use risk_core::Error;
use sqlx::PgPool;

/// Events whose `entity_id` matches the alert's and whose `timestamp` is at
/// or before the alert's `triggered_at`, excluding false positives.
pub async fn for_alert(pool: &PgPool, alert_id: i64) -> Result<Vec<Event>> {
    let rows: Vec<EventRow> = sqlx::query_as(
        "SELECT e.id, e.detection_id, e.entity_id, e.\"timestamp\", e.raw_data, e.context, \
                e.points, e.is_false_positive \
         FROM events e \
         JOIN risk_alerts a ON a.entity_id = e.entity_id \
         WHERE a.id = $1 AND e.\"timestamp\" <= a.triggered_at AND e.is_false_positive = false \
         ORDER BY e.\"timestamp\" ASC",
    )
    .bind(alert_id)
    .fetch_all(pool)
    .await
    .map_err(Error::from)?;

    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    detection_id: i64,
    entity_id: i64,
    timestamp: chrono::DateTime<chrono::Utc>,
    raw_data: Option<String>,
    context: Option<String>,
    points: i64,
    is_false_positive: bool,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            detection_id: row.detection_id,
            entity_id: row.entity_id,
            timestamp: row.timestamp,
            raw_data: row.raw_data,
            context: row.context,
            points: row.points,
            is_false_positive: row.is_false_positive,
        }
    }
}

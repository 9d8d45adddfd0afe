//! Alert Promoter (spec §4.5): the sole creator of risk-alert rows, and the
//! owner of the analyst-driven status lifecycle.

use crate::error::{Result, RiskError};
use crate::model::{AlertStatus, RiskAlert};
use risk_core::Error;
use sqlx::{PgExecutor, Postgres, Transaction};
use tracing::info;

/// Quiet -> Open transition. Must run in the same transaction as the `add`
/// that produced `post_score`, so the debounce check and the insert are
/// linearised per object.
///
/// Debounce: `SELECT 1 ... WHERE entity_id = $1 AND status != 'Closed' FOR
/// UPDATE` serialises promotion decisions for the same object against any
/// concurrent promotion attempt (spec §4.5).
pub async fn maybe_promote(
    tx: &mut Transaction<'_, Postgres>,
    entity_id: i64,
    post_score: i64,
    threshold: i64,
) -> Result<Option<RiskAlert>> {
    if post_score < threshold {
        return Ok(None);
    }

    let open: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM risk_alerts WHERE entity_id = $1 AND status != 'Closed' FOR UPDATE",
    )
    .bind(entity_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(Error::from)?;

    if open.is_some() {
        return Ok(None);
    }

    let row: AlertRow = sqlx::query_as(
        "INSERT INTO risk_alerts (entity_id, triggered_at, total_score, status) \
         VALUES ($1, now(), $2, 'New') \
         RETURNING id, entity_id, triggered_at, total_score, status, notes, owner",
    )
    .bind(entity_id)
    .bind(post_score)
    .fetch_one(&mut **tx)
    .await
    .map_err(Error::from)?;

    info!(entity_id, total_score = post_score, "risk alert promoted");

    Ok(Some(row.try_into()?))
}

pub async fn get<'e, E>(executor: E, alert_id: i64) -> Result<RiskAlert>
where
    E: PgExecutor<'e>,
{
    let row: Option<AlertRow> = sqlx::query_as(
        "SELECT id, entity_id, triggered_at, total_score, status, notes, owner \
         FROM risk_alerts WHERE id = $1",
    )
    .bind(alert_id)
    .fetch_optional(executor)
    .await
    .map_err(Error::from)?;

    row.ok_or(RiskError::AlertNotFound { id: alert_id })?
        .try_into()
}

/// Analyst-driven status transition. Any status may move to any other;
/// the core does not restrict the transition graph (spec §4.5). Notes and
/// owner are opaque and only updated when `Some`.
pub async fn transition_status<'e, E>(
    executor: E,
    alert_id: i64,
    new_status: AlertStatus,
    notes: Option<String>,
    owner: Option<String>,
) -> Result<RiskAlert>
where
    E: PgExecutor<'e>,
{
    let row: Option<AlertRow> = sqlx::query_as(
        "UPDATE risk_alerts SET status = $1, \
             notes = COALESCE($2, notes), \
             owner = COALESCE($3, owner) \
         WHERE id = $4 \
         RETURNING id, entity_id, triggered_at, total_score, status, notes, owner",
    )
    .bind(new_status.as_str())
    .bind(notes)
    .bind(owner)
    .bind(alert_id)
    .fetch_optional(executor)
    .await
    .map_err(Error::from)?;

    row.ok_or(RiskError::AlertNotFound { id: alert_id })?
        .try_into()
}

#[derive(sqlx::FromRow)]
struct AlertRow {
    id: i64,
    entity_id: i64,
    triggered_at: chrono::DateTime<chrono::Utc>,
    total_score: i64,
    status: String,
    notes: Option<String>,
    owner: Option<String>,
}

impl TryFrom<AlertRow> for RiskAlert {
    type Error = RiskError;

    fn try_from(row: AlertRow) -> std::result::Result<Self, Self::Error> {
        let status = AlertStatus::parse(&row.status)
            .ok_or_else(|| RiskError::UnknownAlertStatus(row.status.clone()))?;

        Ok(RiskAlert {
            id: row.id,
            entity_id: row.entity_id,
            triggered_at: row.triggered_at,
            total_score: row.total_score,
            status,
            notes: row.notes,
            owner: row.owner,
        })
    }
}

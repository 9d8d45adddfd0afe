//! Query boundary (spec §6.2): read projections exposed to the outside
//! world.

use crate::error::Result;
use crate::model::{AlertStatus, RiskAlert, RiskObject};
use risk_core::Error;
use sqlx::PgPool;

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub entity_id: Option<i64>,
    pub status: Option<AlertStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// Lists risk objects, optionally filtered by `current_score >= threshold`,
/// ordered by score descending.
pub async fn list_risk_objects(pool: &PgPool, min_score: Option<i64>) -> Result<Vec<RiskObject>> {
    let rows: Vec<RiskObjectRow> = sqlx::query_as(
        "SELECT id, entity_type, entity_value, current_score, last_seen \
         FROM risk_objects WHERE current_score >= $1 ORDER BY current_score DESC",
    )
    .bind(min_score.unwrap_or(0))
    .fetch_all(pool)
    .await
    .map_err(Error::from)?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Lists alerts with optional entity/status filters and `limit`/`offset`
/// paging, ordered by `triggered_at` descending by default.
pub async fn list_alerts(pool: &PgPool, filter: &AlertFilter) -> Result<Vec<RiskAlert>> {
    let status_str = filter.status.map(|s| s.as_str());

    let rows: Vec<AlertRow> = sqlx::query_as(
        "SELECT id, entity_id, triggered_at, total_score, status, notes, owner \
         FROM risk_alerts \
         WHERE ($1::BIGINT IS NULL OR entity_id = $1) \
           AND ($2::TEXT IS NULL OR status = $2) \
         ORDER BY triggered_at DESC \
         LIMIT $3 OFFSET $4",
    )
    .bind(filter.entity_id)
    .bind(status_str)
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(pool)
    .await
    .map_err(Error::from)?;

    rows.into_iter().map(TryInto::try_into).collect()
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
    type Error = crate::error::RiskError;

    fn try_from(row: AlertRow) -> std::result::Result<Self, Self::Error> {
        let status = AlertStatus::parse(&row.status)
            .ok_or_else(|| crate::error::RiskError::UnknownAlertStatus(row.status.clone()))?;

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

#[derive(sqlx::FromRow)]
struct RiskObjectRow {
    id: i64,
    entity_type: String,
    entity_value: String,
    current_score: i64,
    last_seen: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<RiskObjectRow> for RiskObject {
    type Error = crate::error::RiskError;

    fn try_from(row: RiskObjectRow) -> std::result::Result<Self, Self::Error> {
        let kind = crate::model::EntityKind::parse_lowercase(&row.entity_type).ok_or_else(|| {
            crate::error::RiskError::UnknownEntityKind {
                kind: row.entity_type.clone(),
            }
        })?;

        Ok(RiskObject {
            id: row.id,
            kind,
            value: row.entity_value,
            current_score: row.current_score,
            last_seen: row.last_seen,
        })
    }
}

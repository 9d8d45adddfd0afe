//! Entity Registry (spec §4.2): upsert-by-natural-key for risk objects.

use crate::error::{Result, RiskError};
use crate::model::EntityKind;
use chrono::Utc;
use sqlx::{Postgres, Transaction};

const MAX_VALUE_BYTES: usize = 253;

/// Validates a `(kind, value)` pair before it touches storage.
pub fn validate(value: &str) -> Result<()> {
    if value.is_empty() || value.len() > MAX_VALUE_BYTES {
        return Err(RiskError::InvalidEntityValue { len: value.len() });
    }
    Ok(())
}

/// Resolves `(kind, value)` to a stable risk-object id, creating the row
/// with score 0 if absent. Concurrent callers for the same pair converge on
/// the same id via `INSERT ... ON CONFLICT DO NOTHING` followed by a
/// re-select, so at most one caller observes `created = true`.
///
/// Must run inside the caller's ingestion transaction so the resolved id
/// participates in the same atomic event-append.
pub async fn resolve(
    tx: &mut Transaction<'_, Postgres>,
    kind: EntityKind,
    value: &str,
) -> Result<(i64, bool)> {
    validate(value)?;

    let now = Utc::now();
    let inserted: Option<(i64,)> = sqlx::query_as(
        "INSERT INTO risk_objects (entity_type, entity_value, current_score, last_seen) \
         VALUES ($1, $2, 0, $3) \
         ON CONFLICT (entity_type, entity_value) DO NOTHING \
         RETURNING id",
    )
    .bind(kind.as_lowercase())
    .bind(value)
    .bind(now)
    .fetch_optional(&mut **tx)
    .await
    .map_err(risk_core::Error::from)?;

    if let Some((id,)) = inserted {
        return Ok((id, true));
    }

    let (id,): (i64,) = sqlx::query_as(
        "SELECT id FROM risk_objects WHERE entity_type = $1 AND entity_value = $2",
    )
    .bind(kind.as_lowercase())
    .bind(value)
    .fetch_one(&mut **tx)
    .await
    .map_err(risk_core::Error::from)?;

    Ok((id, false))
}

/// Fetches a risk object's id by primary key, for `entity_id`-carrying
/// ingestion records where no `(kind, value)` resolution is needed.
pub async fn exists(tx: &mut Transaction<'_, Postgres>, entity_id: i64) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM risk_objects WHERE id = $1")
        .bind(entity_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(risk_core::Error::from)?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_value() {
        assert!(validate("").is_err());
    }

    #[test]
    fn rejects_oversize_value() {
        let value = "a".repeat(MAX_VALUE_BYTES + 1);
        assert!(validate(&value).is_err());
    }

    #[test]
    fn accepts_boundary_value() {
        let value = "a".repeat(MAX_VALUE_BYTES);
        assert!(validate(&value).is_ok());
    }

    #[test]
    fn preserves_whitespace_verbatim() {
        assert!(validate("  padded  ").is_ok());
    }
}

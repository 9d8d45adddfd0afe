//! Score Accumulator (spec §4.4): the only writer of `current_score` and
//! `last_seen`. Every mutation is a single `UPDATE ... RETURNING` statement,
//! never a read-modify-write from application memory, so concurrent
//! ingestion cannot lose an update.

use crate::error::{Result, RiskError};
use risk_core::Error;
use sqlx::{PgExecutor, Postgres, Transaction};

/// `current_score += points; last_seen = now()`. Returns the post-update
/// score. Runs inside the caller's transaction so it is atomic with the
/// event insert and the promotion check that follows it.
pub async fn add(tx: &mut Transaction<'_, Postgres>, object_id: i64, points: i64) -> Result<i64> {
    let (score,): (i64,) = sqlx::query_as(
        "UPDATE risk_objects SET current_score = current_score + $1, last_seen = now() \
         WHERE id = $2 RETURNING current_score",
    )
    .bind(points)
    .bind(object_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(Error::from)?
    .ok_or(RiskError::RiskObjectNotFound { id: object_id })?;

    Ok(score)
}

/// `current_score = max(0, current_score - points)`. Returns the post-update
/// score. Used by the false-positive reversal path (spec §4.3).
pub async fn subtract(
    tx: &mut Transaction<'_, Postgres>,
    object_id: i64,
    points: i64,
) -> Result<i64> {
    let (score,): (i64,) = sqlx::query_as(
        "UPDATE risk_objects SET current_score = GREATEST(0, current_score - $1) \
         WHERE id = $2 RETURNING current_score",
    )
    .bind(points)
    .bind(object_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(Error::from)?
    .ok_or(RiskError::RiskObjectNotFound { id: object_id })?;

    Ok(score)
}

/// Multiplies every non-zero score by `factor` in a single bulk `UPDATE`.
/// No per-object coordination: decay commutes with `add`/`subtract` only
/// approximately, and that imprecision is accepted (spec §4.7).
pub async fn decay_all<'e, E>(executor: E, factor: f64) -> Result<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE risk_objects SET current_score = FLOOR(current_score * $1) \
         WHERE current_score > 0",
    )
    .bind(factor)
    .execute(executor)
    .await
    .map_err(Error::from)?;

    Ok(result.rows_affected())
}

/// Reads the current score. A pure read; never caches.
pub async fn read<'e, E>(executor: E, object_id: i64) -> Result<i64>
where
    E: PgExecutor<'e>,
{
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT current_score FROM risk_objects WHERE id = $1")
            .bind(object_id)
            .fetch_optional(executor)
            .await
            .map_err(Error::from)?;

    row.map(|(score,)| score)
        .ok_or(RiskError::RiskObjectNotFound { id: object_id })
}

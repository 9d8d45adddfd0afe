//! Minimal read-only view onto detections (spec §1: the detection/technique/
//! data-source CRUD subsystem lives outside this core; only the fields the
//! scoring pipeline needs to read are modelled here).

use crate::error::{Result, RiskError};
use crate::model::{Detection, DetectionStage, EntityKind, Severity};
use sqlx::PgPool;

pub struct Detections<'a> {
    pool: &'a PgPool,
}

impl<'a> Detections<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a detection by id. Fails with `NotFound` if the external
    /// CRUD subsystem never created (or has deleted) the row.
    pub async fn get(&self, id: i64) -> Result<Detection> {
        let row = sqlx::query_as::<_, DetectionRow>(
            "SELECT id, name, stage, severity, default_points, risk_object_kind, class_id \
             FROM detections WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(risk_core::Error::from)?;

        let row = row.ok_or(RiskError::DetectionNotFound { id })?;
        row.try_into()
    }

    /// Cheap existence check used at the ingestion boundary, where an
    /// unknown detection reference is a validation failure (spec §7) rather
    /// than a `NotFound` read miss.
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM detections WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(risk_core::Error::from)?;
        Ok(row.is_some())
    }
}

#[derive(sqlx::FromRow)]
struct DetectionRow {
    id: i64,
    name: String,
    stage: String,
    severity: String,
    default_points: i64,
    risk_object_kind: Option<String>,
    class_id: Option<i64>,
}

impl TryFrom<DetectionRow> for Detection {
    type Error = RiskError;

    fn try_from(row: DetectionRow) -> std::result::Result<Self, Self::Error> {
        let stage = match row.stage.as_str() {
            "idea" => DetectionStage::Idea,
            "draft" => DetectionStage::Draft,
            "test" => DetectionStage::Test,
            "production" => DetectionStage::Production,
            "retired" => DetectionStage::Retired,
            other => {
                return Err(RiskError::Core(risk_core::Error::fatal(format!(
                    "unknown detection stage in storage: {other}"
                ))))
            }
        };

        let severity = match row.severity.as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            other => {
                return Err(RiskError::Core(risk_core::Error::fatal(format!(
                    "unknown detection severity in storage: {other}"
                ))))
            }
        };

        let risk_object_kind = row
            .risk_object_kind
            .as_deref()
            .map(|k| {
                EntityKind::parse_legacy(k).ok_or_else(|| {
                    RiskError::Core(risk_core::Error::fatal(format!(
                        "unknown risk_object_kind in storage: {k}"
                    )))
                })
            })
            .transpose()?;

        Ok(Detection {
            id: row.id,
            name: row.name,
            stage,
            severity,
            default_points: row.default_points,
            risk_object_kind,
            class_id: row.class_id,
        })
    }
}

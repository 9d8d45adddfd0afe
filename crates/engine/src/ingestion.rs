//! Ingestion boundary DTOs and validation (spec §6.1).
//!
//! The wire record admits two ways of naming the target risk object
//! (`entity_id` or `risk_object`); callers resolve that choice into a single
//! [`Target`] before anything reaches the Event Log (spec §9).

use crate::error::{Result, RiskError};
use crate::model::EntityKind;
use chrono::{DateTime, Utc};
use risk_core::config::LimitsConfig;

#[derive(Debug, Clone)]
pub struct RiskObjectRef {
    pub entity_type: EntityKind,
    pub entity_value: String,
}

/// A single ingestion record, already deserialized from its JSON-equivalent
/// wire form. Boundary adapters (out of scope here) own the JSON framing.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub detection_id: i64,
    pub entity_id: Option<i64>,
    pub risk_object: Option<RiskObjectRef>,
    pub timestamp: Option<DateTime<Utc>>,
    pub raw_data: Option<String>,
    pub context: Option<String>,
    pub risk_points: i64,
    pub is_false_positive: bool,
}

/// Resolved target after the `entity_id`-wins rule is applied.
#[derive(Debug, Clone)]
pub enum Target {
    ExistingId(i64),
    ByNaturalKey(RiskObjectRef),
}

impl EventInput {
    /// Validates the record and resolves its target, per spec §6.1 and the
    /// `InvalidInput` bullets in spec §7. Does not touch storage; detection
    /// existence and entity existence are checked by the caller, which has
    /// access to the transaction.
    pub fn validate(&self, limits: &LimitsConfig) -> Result<Target> {
        if self.risk_points < 0 {
            return Err(RiskError::NegativePoints {
                points: self.risk_points,
            });
        }

        if let Some(raw) = &self.raw_data {
            if raw.len() > limits.max_raw_data_bytes {
                return Err(RiskError::RawDataTooLarge {
                    limit: limits.max_raw_data_bytes,
                    len: raw.len(),
                });
            }
        }

        if let Some(ctx) = &self.context {
            if ctx.len() > limits.max_context_bytes {
                return Err(RiskError::ContextTooLarge {
                    limit: limits.max_context_bytes,
                    len: ctx.len(),
                });
            }
            serde_json::from_str::<serde_json::Value>(ctx)
                .map_err(|e| RiskError::InvalidContextJson(e.to_string()))?;
        }

        match (self.entity_id, &self.risk_object) {
            (Some(id), _) => Ok(Target::ExistingId(id)),
            (None, Some(obj)) => {
                crate::registry::validate(&obj.entity_value)?;
                Ok(Target::ByNaturalKey(obj.clone()))
            }
            (None, None) => Err(RiskError::AmbiguousTarget),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig {
            max_raw_data_bytes: 10,
            max_context_bytes: 10,
        }
    }

    fn base_input() -> EventInput {
        EventInput {
            detection_id: 1,
            entity_id: Some(7),
            risk_object: None,
            timestamp: None,
            raw_data: None,
            context: None,
            risk_points: 10,
            is_false_positive: false,
        }
    }

    #[test]
    fn entity_id_wins_over_risk_object() {
        let mut input = base_input();
        input.risk_object = Some(RiskObjectRef {
            entity_type: EntityKind::Host,
            entity_value: "workstation-042".to_string(),
        });
        match input.validate(&limits()).unwrap() {
            Target::ExistingId(id) => assert_eq!(id, 7),
            Target::ByNaturalKey(_) => panic!("entity_id must win"),
        }
    }

    #[test]
    fn rejects_neither_target() {
        let mut input = base_input();
        input.entity_id = None;
        assert!(matches!(
            input.validate(&limits()),
            Err(RiskError::AmbiguousTarget)
        ));
    }

    #[test]
    fn rejects_negative_points() {
        let mut input = base_input();
        input.risk_points = -1;
        assert!(matches!(
            input.validate(&limits()),
            Err(RiskError::NegativePoints { .. })
        ));
    }

    #[test]
    fn rejects_oversize_raw_data() {
        let mut input = base_input();
        input.raw_data = Some("x".repeat(11));
        assert!(matches!(
            input.validate(&limits()),
            Err(RiskError::RawDataTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_malformed_context_json() {
        let mut input = base_input();
        input.context = Some("{not json".to_string());
        assert!(matches!(
            input.validate(&limits()),
            Err(RiskError::InvalidContextJson(_))
        ));
    }
}

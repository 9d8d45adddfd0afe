//! Domain types (spec §3). Closed-set fields are sum types with a single
//! conversion point to/from their wire spelling (spec §9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A risk object's kind. Wire form is lowercase; the detections table
/// preserves the legacy capitalised spelling (`User`/`Host`/`IP`) for its own
/// `risk_object_kind` column per spec §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Host,
    Ip,
}

impl EntityKind {
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Host => "host",
            EntityKind::Ip => "ip",
        }
    }

    /// Legacy capitalised spelling used on `detections.risk_object_kind`.
    pub fn as_legacy(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Host => "Host",
            EntityKind::Ip => "IP",
        }
    }

    pub fn parse_lowercase(s: &str) -> Option<Self> {
        match s {
            "user" => Some(EntityKind::User),
            "host" => Some(EntityKind::Host),
            "ip" => Some(EntityKind::Ip),
            _ => None,
        }
    }

    pub fn parse_legacy(s: &str) -> Option<Self> {
        match s {
            "User" => Some(EntityKind::User),
            "Host" => Some(EntityKind::Host),
            "IP" => Some(EntityKind::Ip),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStage {
    Idea,
    Draft,
    Test,
    Production,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Alert lifecycle status (spec §4.5). Any status may move to any other
/// except that a debounced re-promotion never fires against a non-`Closed`
/// alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    New,
    Triage,
    Investigation,
    #[serde(rename = "On Hold")]
    OnHold,
    Incident,
    Closed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::New => "New",
            AlertStatus::Triage => "Triage",
            AlertStatus::Investigation => "Investigation",
            AlertStatus::OnHold => "On Hold",
            AlertStatus::Incident => "Incident",
            AlertStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(AlertStatus::New),
            "Triage" => Some(AlertStatus::Triage),
            "Investigation" => Some(AlertStatus::Investigation),
            "On Hold" => Some(AlertStatus::OnHold),
            "Incident" => Some(AlertStatus::Incident),
            "Closed" => Some(AlertStatus::Closed),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, AlertStatus::Closed)
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub id: i64,
    pub name: String,
    pub stage: DetectionStage,
    pub severity: Severity,
    pub default_points: i64,
    pub risk_object_kind: Option<EntityKind>,
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct DetectionClass {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_system: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone)]
pub struct RiskObject {
    pub id: i64,
    pub kind: EntityKind,
    pub value: String,
    pub current_score: i64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub detection_id: i64,
    pub entity_id: i64,
    pub timestamp: DateTime<Utc>,
    pub raw_data: Option<String>,
    pub context: Option<String>,
    pub points: i64,
    pub is_false_positive: bool,
}

#[derive(Debug, Clone)]
pub struct RiskAlert {
    pub id: i64,
    pub entity_id: i64,
    pub triggered_at: DateTime<Utc>,
    pub total_score: i64,
    pub status: AlertStatus,
    pub notes: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FalsePositiveRecord {
    pub id: i64,
    pub event_id: i64,
    pub analyst: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

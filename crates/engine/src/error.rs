use thiserror::Error;

/// Domain errors layered on top of [`risk_core::Error`].
///
/// Every variant still maps to one of the five core [`risk_core::ErrorKind`]s
/// via [`RiskError::kind`]; this type exists to carry names the boundary
/// adapter can match on (`RiskObjectNotFound` vs a bare `NotFound` string).
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("risk object not found: {id}")]
    RiskObjectNotFound { id: i64 },

    #[error("detection not found: {id}")]
    DetectionNotFound { id: i64 },

    #[error("event not found: {id}")]
    EventNotFound { id: i64 },

    #[error("alert not found: {id}")]
    AlertNotFound { id: i64 },

    #[error("risk object value must be 1-253 bytes: got {len}")]
    InvalidEntityValue { len: usize },

    #[error("unknown risk object kind: {kind}")]
    UnknownEntityKind { kind: String },

    #[error("exactly one of entity_id or risk_object must be present")]
    AmbiguousTarget,

    #[error("risk_points must be >= 0: got {points}")]
    NegativePoints { points: i64 },

    #[error("raw_data exceeds {limit} bytes: got {len}")]
    RawDataTooLarge { limit: usize, len: usize },

    #[error("context exceeds {limit} bytes: got {len}")]
    ContextTooLarge { limit: usize, len: usize },

    #[error("context is not valid JSON: {0}")]
    InvalidContextJson(String),

    #[error("unknown alert status: {0}")]
    UnknownAlertStatus(String),

    #[error("batch rejected: event at index {index} failed validation: {source}")]
    BatchValidation {
        index: usize,
        #[source]
        source: Box<RiskError>,
    },

    #[error(transparent)]
    Core(#[from] risk_core::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;

impl RiskError {
    /// Collapses the domain-specific variants onto the five-kind taxonomy.
    pub fn kind(&self) -> risk_core::ErrorKind {
        use risk_core::ErrorKind;
        match self {
            RiskError::RiskObjectNotFound { .. }
            | RiskError::DetectionNotFound { .. }
            | RiskError::EventNotFound { .. }
            | RiskError::AlertNotFound { .. } => ErrorKind::NotFound,

            RiskError::InvalidEntityValue { .. }
            | RiskError::UnknownEntityKind { .. }
            | RiskError::AmbiguousTarget
            | RiskError::NegativePoints { .. }
            | RiskError::RawDataTooLarge { .. }
            | RiskError::ContextTooLarge { .. }
            | RiskError::InvalidContextJson(_)
            | RiskError::UnknownAlertStatus(_) => ErrorKind::InvalidInput,

            RiskError::BatchValidation { .. } => ErrorKind::InvalidInput,

            RiskError::Core(e) => e.kind,
        }
    }
}

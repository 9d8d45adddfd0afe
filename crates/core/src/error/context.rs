use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Structured metadata attached to an [`Error`](super::Error) for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique identifier for this error instance.
    pub error_id: String,
    /// Additional structured data (e.g. the offending batch index).
    pub metadata: HashMap<String, serde_json::Value>,
    /// Stack of error origins, for chained errors.
    pub trace: Vec<String>,
    /// Timestamp when the error occurred.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            error_id: Uuid::new_v4().to_string(),
            metadata: HashMap::new(),
            trace: Vec::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn add_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace.push(trace.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

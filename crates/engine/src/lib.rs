pub mod alerts;
pub mod contributing;
pub mod decay;
pub mod detections;
pub mod efficacy;
pub mod engine;
pub mod error;
pub mod events;
pub mod ingestion;
pub mod model;
pub mod queries;
pub mod registry;
pub mod score;
pub mod store;

pub use engine::RiskEngine;
pub use error::{Result, RiskError};
pub use model::*;

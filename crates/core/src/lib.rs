pub mod config;
pub mod database;
pub mod error;
pub mod tasks;

pub use config::Config;
pub use database::DatabasePool;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use tasks::PeriodicTask;

pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;

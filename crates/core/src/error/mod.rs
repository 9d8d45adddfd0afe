//! Error taxonomy shared by every component of the core (spec §7).
//!
//! All fallible core operations return [`Error`], which carries exactly one
//! of five [`ErrorKind`]s: `InvalidInput`, `NotFound`, `Conflict`,
//! `Transient`, `Fatal`. The core never swallows errors and mutations never
//! leave partial state — see the transaction boundaries in
//! `risk_engine::events` and `risk_engine::alerts`.

pub mod codes;
pub mod context;
pub mod framework;

pub use codes::ErrorKind;
pub use context::ErrorContext;
pub use framework::{Error, Result};

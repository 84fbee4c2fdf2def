//! Grievance Core - shared infrastructure for the grievance portal client
//!
//! Error taxonomy, logging bootstrap and configuration used by every other crate
//! in the workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-exported for the logging macros' callers
pub use tracing;

//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the sync engine crates:
//! - Logging and tracing infrastructure
//! - Run configuration (JSON file, environment overlay, validation)
//! - Pacing between outbound calls

pub mod config;
pub mod error;
pub mod logging;
pub mod pacing;

pub use config::RunConfig;
pub use error::{Error, Result};
pub use pacing::Pacer;

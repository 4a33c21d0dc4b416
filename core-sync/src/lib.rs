//! # Sync Run Engine
//!
//! Orchestrates one pass over the configured query axes: fetch from every
//! source, admit, dedup against the ledger, reconcile with the remote CMS,
//! publish and record.
//!
//! ## Components
//!
//! - **Query axes** (`axes`): region selection (explicit, weekday rotation
//!   or all) and expansion into region × country × locale queries
//! - **Candidate state machine** (`candidate`): validated per-listing
//!   transitions from fetched to a terminal state
//! - **Run orchestrator** (`coordinator`): sequential, paced pipeline with
//!   ledger load, prune and save
//! - **Run summary** (`summary`): counters and read-back sample

pub mod axes;
pub mod candidate;
pub mod coordinator;
pub mod error;
pub mod summary;

pub use axes::{expand, rotation_region, select_regions, QueryAxis, RegionFilter};
pub use candidate::{Candidate, CandidateState};
pub use coordinator::{RunOrchestrator, RunSettings, SourceHandle};
pub use error::{Result, SyncError};
pub use summary::RunSummary;

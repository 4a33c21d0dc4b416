//! Workspace placeholder crate.
//!
//! This crate exists to expose feature flags that map to the individual
//! workspace crates. Host applications can depend on `jobsync-workspace` and
//! enable `service` (full wiring with the desktop HTTP bridge and the
//! WordPress provider) or `engine` (the run orchestrator only, for callers
//! that inject their own bridges).

#[cfg(feature = "service")]
pub use core_service as service;

#[cfg(feature = "engine")]
pub use core_sync as engine;

//! # Host Bridge Traits
//!
//! Contracts between the sync engine and the outside world.
//!
//! ## Overview
//!
//! The engine never talks to the network directly. Everything remote goes
//! through one of the traits below, so the ledger, reconciliation and
//! publishing logic can be exercised against in-memory fakes.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Single-attempt async HTTP transport
//! - [`PublishingEndpoint`](publishing::PublishingEndpoint) - Remote CMS: search, create, media upload
//! - [`SourceConnector`](source::SourceConnector) - Job listing sources
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`RetryPolicy`](retry::RetryPolicy) - Bounded retry for transient transport failures
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should:
//!
//! - Report failures that never reached the remote as `Transport`
//! - Report any non-success answer as `Status` with a body excerpt
//! - Report a missing create route as `RouteNotFound`
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc` between the orchestrator and its collaborators.

pub mod error;
pub mod http;
pub mod publishing;
pub mod retry;
pub mod source;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use publishing::{MediaRef, MediaUpload, PostDraft, PublishingEndpoint, RemotePost};
pub use retry::{Jitter, RetryPolicy};
pub use source::{RawListing, SourceConnector, SourceQuery};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};

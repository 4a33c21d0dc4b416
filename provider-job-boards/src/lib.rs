//! # Job Board Sources
//!
//! `SourceConnector` implementations for public job-board JSON APIs:
//!
//! | Source | Endpoint | Query handling |
//! |---|---|---|
//! | Remotive | `remotive.com/api/remote-jobs` | server-side `search` |
//! | RemoteOK | `remoteok.com/api` | client-side filter on title, company, tags |
//! | Arbeitnow | `arbeitnow.com/api/job-board-api` | client-side filter on title |
//! | Jobicy | `jobicy.com/api/v2/remote-jobs` | server-side `tag` |
//! | Himalayas | `himalayas.app/jobs/api` | server-side `q` |
//! | JSearch | `jsearch.p.rapidapi.com/search` | server-side, needs an API key |
//!
//! Every connector swallows its own failures and yields an empty list; a
//! broken source never stops a run.

mod client;
pub mod error;
pub mod registry;

pub mod arbeitnow;
pub mod himalayas;
pub mod jobicy;
pub mod jsearch;
pub mod remoteok;
pub mod remotive;

pub use error::{Result, SourceError};
pub use registry::{build_connector, SourceKind};

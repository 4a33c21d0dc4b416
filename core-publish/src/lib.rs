//! # Core Publish
//!
//! Everything between "this listing is new to the ledger" and "this listing
//! is a post on the CMS":
//!
//! - [`Reconciler`] asks the remote whether an equivalent post already exists
//! - [`RouteResolver`] picks the create route once per run
//! - [`Publisher`] runs admission, reconciliation, media upload and create
//! - [`content`] renders the post body and classifies the listing
//! - [`LogoFetcher`] fetches and downsizes company logos

pub mod content;
pub mod error;
pub mod media;
pub mod publisher;
pub mod reconciler;
pub mod route;

pub use content::{classify, slugify, Classification, PostTemplate};
pub use error::{PublishError, Result};
pub use media::{company_domain, LogoAsset, LogoFetcher};
pub use publisher::{Publisher, RemoteRef};
pub use reconciler::{titles_match, Reconciler};
pub use route::{RouteResolver, RouteState};

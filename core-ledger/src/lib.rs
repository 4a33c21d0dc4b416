//! # Listing Ledger
//!
//! Identity and local history of published listings.
//!
//! - [`identity`] derives a stable [`ListingKey`] from a normalized listing
//!   and gates structurally invalid listings.
//! - [`ledger`] holds the in-memory [`Ledger`] with any-match lookups.
//! - [`store`] loads and saves the ledger file, upgrading legacy formats.
//! - [`retention`] prunes entries older than a horizon.

pub mod error;
pub mod identity;
pub mod ledger;
pub mod retention;
pub mod store;

pub use error::{LedgerError, Result};
pub use identity::{compute_key, is_acceptable, ListingKey, NormalizedListing};
pub use ledger::{Ledger, LedgerEntry};
pub use retention::prune;
pub use store::LedgerStore;

//! # WordPress Provider
//!
//! Implements `PublishingEndpoint` for the WordPress REST API (`/wp-json`).
//!
//! ## Overview
//!
//! This module provides:
//! - Application-password (HTTP Basic) authentication
//! - Global search used for reconciliation
//! - Post creation on a configurable post type route
//! - Media library uploads for featured images
//! - Read-back of recent posts

pub mod connector;
pub mod error;
pub mod types;

pub use connector::WordPressConnector;
pub use error::{Result, WordPressError};

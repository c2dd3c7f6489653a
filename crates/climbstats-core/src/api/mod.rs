//! REST API client module for TopLogger.
//!
//! This module provides the `ApiClient` for fetching a gym's climb catalog.
//! The climbs endpoint is public; no authentication is involved.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

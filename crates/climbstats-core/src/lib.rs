//! Core library for climbstats.
//!
//! Fetches a gym's climb catalog from the TopLogger API, caches it locally
//! and derives how many routes of each grade were on the walls each day.
//!
//! - [`api`]: HTTP client for the climbs endpoint
//! - [`models`]: climb records, grades and availability cells
//! - [`cache`]: freshness-checked JSON cache with atomic writes
//! - [`expand`]: interval expansion into a dense day × grade table
//! - [`config`]: build-time constants for a run

pub mod api;
pub mod cache;
pub mod config;
pub mod expand;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheError, CacheManager};
pub use config::Config;
pub use expand::{expand, ExpandError};
pub use models::{AvailabilityCell, Climb, Grade, GradeSeries, RawClimb};

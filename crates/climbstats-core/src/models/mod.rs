//! Data models for climbstats.
//!
//! - `RawClimb`: a climb as returned by the API, before normalization
//! - `Climb`: a normalized climb with a closed live interval
//! - `Grade`: a numeric difficulty with total ordering
//! - `AvailabilityCell`, `GradeSeries`: the derived per-day counts

pub mod availability;
pub mod climb;
pub mod grade;

use serde::Deserialize;

pub use availability::{rollup_by_integer_grade, AvailabilityCell, GradeSeries};
pub use climb::{normalize, parse_timestamp, Climb, ClimbError, ClimbId, RawClimb};
pub use grade::Grade;

/// A JSON scalar the API may send as either a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

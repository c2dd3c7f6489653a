use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{de, Deserialize, Deserializer, Serialize};

use super::climb::ClimbError;
use super::Scalar;

/// Climbing difficulty. TopLogger grades are fractional (`"6.33"`), so this
/// wraps a finite `f64` and gives it the `Eq`/`Ord`/`Hash` a grade axis needs.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Grade(f64);

impl Grade {
    pub fn new(value: f64) -> Result<Self, ClimbError> {
        if !value.is_finite() {
            return Err(ClimbError::InvalidGrade(value.to_string()));
        }
        // -0.0 and 0.0 must hash the same
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whole-number part, used to group fractional grades for display.
    pub fn integer(self) -> i64 {
        self.0.trunc() as i64
    }
}

impl PartialEq for Grade {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Grade {}

impl Hash for Grade {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Grade {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Grade {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match Scalar::deserialize(deserializer)? {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("invalid grade: {:?}", s)))?,
        };
        Grade::new(value).map_err(de::Error::custom)
    }
}

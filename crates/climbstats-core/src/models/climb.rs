use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{Grade, Scalar};

#[derive(Error, Debug)]
pub enum ClimbError {
    #[error("Invalid grade: {0}")]
    InvalidGrade(String),

    #[error("Invalid timestamp for climb {id}: {value:?}")]
    InvalidTimestamp { id: ClimbId, value: String },
}

/// Climb identifier. Kept as text because the API is not consistent about
/// sending it as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClimbId(String);

impl ClimbId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClimbId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ClimbId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Int(v) => Self(v.to_string()),
            Scalar::Float(v) => Self(v.to_string()),
            Scalar::Text(s) => Self(s),
        })
    }
}

/// A climb as the TopLogger climbs endpoint returns it. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClimb {
    pub id: ClimbId,
    pub grade: Grade,
    #[serde(rename = "date_live_start", default)]
    pub live_start: Option<String>,
    #[serde(rename = "date_live_end", default)]
    pub live_end: Option<String>,
}

/// A climb with a closed live interval, at second precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    pub id: ClimbId,
    pub grade: Grade,
    pub live_start: DateTime<Utc>,
    pub live_end: DateTime<Utc>,
}

impl Climb {
    /// Inclusive on both ends.
    pub fn is_live_at(&self, at: DateTime<Utc>) -> bool {
        self.live_start <= at && at <= self.live_end
    }
}

/// Parse an API timestamp. Accepts RFC 3339, naive date-times (read as UTC)
/// and bare dates. Sub-second precision is dropped.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let parsed = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
    {
        naive.and_utc()
    } else {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
    };
    Some(parsed.trunc_subsecs(0))
}

/// Turn raw API climbs into `Climb`s.
///
/// Climbs without a start date are dropped. A missing end date means the
/// climb is still up, so it is closed at `now`. Duplicate ids are kept.
pub fn normalize(raw: Vec<RawClimb>, now: DateTime<Utc>) -> Result<Vec<Climb>, ClimbError> {
    let now = now.trunc_subsecs(0);
    let total = raw.len();
    let mut climbs = Vec::with_capacity(total);
    let mut still_live = 0usize;

    for climb in raw {
        let Some(start) = non_blank(&climb.live_start) else {
            continue;
        };
        let live_start = parse_timestamp(start).ok_or_else(|| ClimbError::InvalidTimestamp {
            id: climb.id.clone(),
            value: start.to_string(),
        })?;

        let live_end = match non_blank(&climb.live_end) {
            Some(end) => parse_timestamp(end).ok_or_else(|| ClimbError::InvalidTimestamp {
                id: climb.id.clone(),
                value: end.to_string(),
            })?,
            None => {
                still_live += 1;
                now
            }
        };

        climbs.push(Climb {
            id: climb.id,
            grade: climb.grade,
            live_start,
            live_end,
        });
    }

    debug!(
        total,
        kept = climbs.len(),
        dropped = total - climbs.len(),
        still_live,
        "Normalized climbs"
    );
    Ok(climbs)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

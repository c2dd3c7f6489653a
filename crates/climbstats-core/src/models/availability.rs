use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Grade;

/// Number of climbs of `grade` that were live at `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCell {
    pub date: DateTime<Utc>,
    pub grade: Grade,
    pub count: u32,
}

/// Daily counts for one whole-number grade.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSeries {
    pub grade: i64,
    pub points: Vec<(NaiveDate, u32)>,
}

impl GradeSeries {
    pub fn peak(&self) -> u32 {
        self.points.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }
}

/// Sum the counts of fractional grades sharing a whole-number part, per day.
/// Series come back ordered by grade, points ordered by date.
pub fn rollup_by_integer_grade(cells: &[AvailabilityCell]) -> Vec<GradeSeries> {
    let mut grouped: BTreeMap<i64, BTreeMap<NaiveDate, u32>> = BTreeMap::new();
    for cell in cells {
        *grouped
            .entry(cell.grade.integer())
            .or_default()
            .entry(cell.date.date_naive())
            .or_default() += cell.count;
    }

    grouped
        .into_iter()
        .map(|(grade, days)| GradeSeries {
            grade,
            points: days.into_iter().collect(),
        })
        .collect()
}

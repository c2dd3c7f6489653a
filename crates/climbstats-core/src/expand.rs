//! Interval expansion.
//!
//! Turns climbs, each live over `[live_start, live_end]`, into a dense table
//! with one `AvailabilityCell` per (day, grade). The day axis starts at the
//! earliest `live_start` and steps one day at a time up to the latest
//! `live_start`. Climbs still up after that last start are not visible past
//! it; the axis never extends beyond the newest route.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{AvailabilityCell, Climb, Grade};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExpandError {
    #[error("No climbs to expand - the climb table is empty")]
    NoClimbs,
}

/// Sorted interval endpoints of one grade's climbs.
#[derive(Debug, Default)]
struct Intervals {
    starts: Vec<DateTime<Utc>>,
    ends: Vec<DateTime<Utc>>,
}

impl Intervals {
    fn push(&mut self, climb: &Climb) {
        self.starts.push(climb.live_start);
        self.ends.push(climb.live_end);
    }

    fn sort(&mut self) {
        self.starts.sort_unstable();
        self.ends.sort_unstable();
    }

    /// Climbs with `start <= at <= end`. Every climb that ended before `at`
    /// also started before it, so the difference is never negative.
    fn live_at(&self, at: DateTime<Utc>) -> u32 {
        let started = self.starts.partition_point(|s| *s <= at);
        let ended = self.ends.partition_point(|e| *e < at);
        (started - ended) as u32
    }
}

/// `min(live_start) + k days` for every k that stays at or before `max(live_start)`.
pub fn date_axis(climbs: &[Climb]) -> Result<Vec<DateTime<Utc>>, ExpandError> {
    let first = climbs
        .iter()
        .map(|c| c.live_start)
        .min()
        .ok_or(ExpandError::NoClimbs)?;
    let last = climbs
        .iter()
        .map(|c| c.live_start)
        .max()
        .ok_or(ExpandError::NoClimbs)?;

    let mut dates = Vec::with_capacity((last - first).num_days() as usize + 1);
    let mut date = first;
    while date <= last {
        dates.push(date);
        date += Duration::days(1);
    }
    Ok(dates)
}

/// Distinct grades, ascending.
pub fn grade_axis(climbs: &[Climb]) -> Vec<Grade> {
    climbs
        .iter()
        .map(|c| c.grade)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Expand climbs into one cell per (day, grade), ordered by day then grade.
pub fn expand(climbs: &[Climb]) -> Result<Vec<AvailabilityCell>, ExpandError> {
    let dates = date_axis(climbs)?;
    let grades = grade_axis(climbs);

    let mut by_grade: HashMap<Grade, Intervals> = HashMap::with_capacity(grades.len());
    let mut inverted = 0usize;
    for climb in climbs {
        // An interval ending before it starts contains no date at all
        if climb.live_end < climb.live_start {
            inverted += 1;
            continue;
        }
        by_grade.entry(climb.grade).or_default().push(climb);
    }
    if inverted > 0 {
        debug!(inverted, "Skipping climbs whose live end precedes their start");
    }
    by_grade.values_mut().for_each(Intervals::sort);

    let mut cells = Vec::with_capacity(dates.len() * grades.len());
    for date in &dates {
        for grade in &grades {
            let count = by_grade.get(grade).map_or(0, |i| i.live_at(*date));
            cells.push(AvailabilityCell {
                date: *date,
                grade: *grade,
                count,
            });
        }
    }

    info!(
        days = dates.len(),
        grades = grades.len(),
        cells = cells.len(),
        "Expanded climbs into availability table"
    );
    Ok(cells)
}

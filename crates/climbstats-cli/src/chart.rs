//! Stacked area chart of routes per whole-number grade.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use climbstats_core::GradeSeries;
use plotters::coord::types::RangedDate;
use plotters::coord::Shift;
use plotters::prelude::*;

const CHART_WIDTH: u32 = 1280;
const CHART_HEIGHT: u32 = 760;

/// One band of the stack: counts for `grade` plus every lower grade.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub grade: i64,
    pub points: Vec<(NaiveDate, u32)>,
}

/// Running totals over grades, lowest grade first.
pub fn stack(series: &[GradeSeries]) -> Vec<Layer> {
    let mut running: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    series
        .iter()
        .map(|s| {
            let points = s
                .points
                .iter()
                .map(|(date, count)| {
                    let total = running.entry(*date).or_default();
                    *total += count;
                    (*date, *total)
                })
                .collect();
            Layer {
                grade: s.grade,
                points,
            }
        })
        .collect()
}

/// Render the chart as SVG, overwriting `path`.
pub fn render(path: &Path, series: &[GradeSeries], start: NaiveDate, end: NaiveDate) -> Result<()> {
    let root = SVGBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    draw(root, series, start, end)
}

fn draw<DB>(
    root: DrawingArea<DB, Shift>,
    series: &[GradeSeries],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let in_range = |date: &NaiveDate| *date >= start && *date <= end;
    let layers: Vec<Layer> = stack(series)
        .into_iter()
        .map(|layer| Layer {
            grade: layer.grade,
            points: layer.points.into_iter().filter(|(d, _)| in_range(d)).collect(),
        })
        .collect();

    let y_max = layers
        .last()
        .and_then(|top| top.points.iter().map(|(_, c)| *c).max())
        .unwrap_or(0)
        .max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Routes per difficulty", ("sans-serif", 26))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(RangedDate::from(start..end), 0u32..(y_max + y_max / 10))?;

    // One tick per half year, like Jan/Jul
    let half_years = ((end.year() - start.year()) as usize + 1) * 2;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Date")
        .y_desc("Climbs")
        .x_labels(half_years)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
        .draw()?;

    // Tallest band first so each lower grade paints over the one above
    for (index, layer) in layers.iter().enumerate().rev() {
        let color = Palette99::pick(index).mix(0.9);
        chart
            .draw_series(AreaSeries::new(layer.points.iter().copied(), 0, color.filled()))?
            .label(layer.grade.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

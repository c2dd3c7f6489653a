//! climbstats - how many routes of each difficulty a gym has had over time.
//!
//! Loads the gym's climb catalog (from cache when fresh), expands it into
//! daily per-grade route counts and writes a stacked area chart.

mod chart;

use std::io;

use anyhow::Result;
use chrono::Utc;
use climbstats_core::models::rollup_by_integer_grade;
use climbstats_core::{expand, ApiClient, CacheManager, Config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    info!("climbstats starting");

    let config = Config::default();
    let cache = CacheManager::new(config.cache_dir.clone())?;
    let api = ApiClient::new(config.climbs_url.clone())?;

    let climbs = cache
        .climbs_or_fetch(config.climbs_max_age, || api.fetch_climbs(Utc::now()))
        .await?;
    info!(count = climbs.len(), "Climbs loaded");

    // Depends on the climbs above, so only runs once they are loaded
    let cells = cache
        .availability_or_fetch(config.availability_max_age, || async {
            expand(&climbs).map_err(anyhow::Error::from)
        })
        .await?;
    info!(cells = cells.len(), "Availability table loaded");

    let series = rollup_by_integer_grade(&cells);
    chart::render(
        &config.chart_path,
        &series,
        config.chart_start,
        Utc::now().date_naive(),
    )?;
    info!(path = %config.chart_path.display(), grades = series.len(), "Chart written");

    Ok(())
}

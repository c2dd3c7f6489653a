//! Run configuration.
//!
//! All values are fixed at build time; there are no flags, environment
//! variables or config files. The cache lives under the platform cache
//! directory (`~/.cache/climbstats` on Linux).

use std::path::PathBuf;

use chrono::{Duration, NaiveDate};

/// Application name used for the cache directory path
const APP_NAME: &str = "climbstats";

/// Climbs endpoint for the gym being plotted
const CLIMBS_URL: &str = "https://api.toplogger.nu/v1/gyms/21/climbs/";

/// Both cached tables are refreshed after 10 days
const CACHE_MAX_AGE_DAYS: i64 = 10;

/// Chart output, relative to the working directory
const CHART_PATH: &str = "routes_per_difficulty.svg";

#[derive(Debug, Clone)]
pub struct Config {
    pub climbs_url: String,
    pub cache_dir: PathBuf,
    pub climbs_max_age: Option<Duration>,
    pub availability_max_age: Option<Duration>,
    pub chart_path: PathBuf,
    /// Left edge of the chart's date axis
    pub chart_start: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            climbs_url: CLIMBS_URL.to_string(),
            cache_dir: Self::default_cache_dir(),
            climbs_max_age: Some(Duration::days(CACHE_MAX_AGE_DAYS)),
            availability_max_age: Some(Duration::days(CACHE_MAX_AGE_DAYS)),
            chart_path: PathBuf::from(CHART_PATH),
            chart_start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
        }
    }
}

impl Config {
    fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("./cache"))
    }
}

//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation and forecasting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One country-day observation after cleaning.
///
/// Numeric fields are never NaN: missing numeric cells are coerced to `0.0`
/// during ingest. `total_recovered` is `None` for every record when the source
/// dataset lacks the column entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub location: String,
    pub date: NaiveDate,
    pub total_cases: f64,
    pub new_cases: f64,
    pub total_deaths: f64,
    pub new_deaths: f64,
    pub total_recovered: Option<f64>,
}

/// Which per-country summary statistic the Aggregator ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMetric {
    /// Sum of `total_cases` over all dates.
    Sum,
    /// Maximum `total_cases` (the latest cumulative count for a gapless series).
    Max,
    /// Mean of `total_recovered / total_cases` (requires the optional column).
    Recovery,
}

impl SummaryMetric {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            SummaryMetric::Sum => "sum of total cases",
            SummaryMetric::Max => "max total cases",
            SummaryMetric::Recovery => "mean recovery rate",
        }
    }
}

/// Aggregated per-country statistic used for ranking/plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub location: String,
    /// Value of the ranking metric for this location.
    pub value: f64,
    /// Mean recovery rate, when the `total_recovered` column is present.
    pub recovery_rate: Option<f64>,
}

/// Point forecast plus 95% prediction interval for the next `horizon` steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Selected (p, d, q) order.
    pub order: (usize, usize, usize),
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    /// Residual standard deviation of the fitted model.
    pub sigma: f64,
    /// Corrected Akaike information criterion of the selected model.
    pub aicc: f64,
    /// Last observed date; forecast step `i` is `last_date + (i + 1)` days.
    pub last_date: NaiveDate,
}

impl ForecastResult {
    /// Calendar date of forecast step `i` (0-based).
    pub fn step_date(&self, i: usize) -> NaiveDate {
        self.last_date + chrono::Duration::days(i as i64 + 1)
    }
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub location: String,
    pub horizon: usize,
    pub forecast: ForecastResult,
}

/// Where the raw dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// HTTP GET of the dataset CSV (URL from `EPI_DATA_URL` or the default).
    Remote,
    /// A local CSV file with the same schema.
    File(PathBuf),
    /// Deterministic synthetic dataset (seeded).
    Sample { days: usize, seed: u64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: DataSource,
    pub country: String,
    pub metric: SummaryMetric,
    /// Locations excluded from rankings (compared case-insensitively).
    pub exclusions: Vec<String>,
    pub top_n: usize,
    pub horizon: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
    pub export_forecast: Option<PathBuf>,
}

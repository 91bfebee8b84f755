//! Command-line parsing for the epidemic trends pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the analysis/forecasting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::SummaryMetric;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "epi", version, about = "COVID-19 time-series analysis pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: clean, rank, forecast, plot, and export.
    Run(RunArgs),
    /// Print the per-country ranking table only (useful for scripting).
    Rank(RunArgs),
    /// Forecast one country's daily new cases and print the band chart.
    Forecast(RunArgs),
}

/// Common options for all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Read the dataset from a local CSV instead of fetching it.
    #[arg(long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Use a deterministic synthetic dataset instead of fetching.
    #[arg(long)]
    pub sample: bool,

    /// Length of the synthetic dataset in days.
    #[arg(long, default_value_t = 180)]
    pub sample_days: usize,

    /// Random seed for synthetic dataset generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Country to filter, forecast, and export.
    #[arg(short = 'c', long, default_value = "India")]
    pub country: String,

    /// Ranking metric for the aggregation step.
    #[arg(long, value_enum, default_value_t = SummaryMetric::Sum)]
    pub metric: SummaryMetric,

    /// Location excluded from rankings (repeatable; replaces the default
    /// pseudo-location list when given).
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Number of locations to keep in the ranking (strict truncation).
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Forecast horizon in days.
    #[arg(long, default_value_t = 30)]
    pub horizon: usize,

    /// Render charts in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Path for the cleaned country-subset CSV export.
    #[arg(long, default_value = "cleaned_covid_data.csv")]
    pub export: PathBuf,

    /// Skip the CSV export.
    #[arg(long)]
    pub no_export: bool,

    /// Export the forecast (order + band) to JSON.
    #[arg(long = "export-forecast", value_name = "JSON")]
    pub export_forecast: Option<PathBuf>,
}

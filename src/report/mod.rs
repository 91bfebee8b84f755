//! Terminal report formatting.

mod format;

pub use format::{format_forecast_summary, format_rankings, format_run_summary};

//! Shared pipeline logic used by all subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> filter -> aggregate -> forecast
//!
//! Each stage produces an immutable intermediate result stored on `RunOutput`,
//! and the forecast is stored as a `Result` rather than propagated: charts are
//! rendered from independent, already-computed inputs, so a failed forecast
//! never blocks the other outputs.

use crate::analysis::{aggregate, filter_country};
use crate::data::{generate_sample_csv, DatasetClient};
use crate::domain::{
    CountrySummary, DataSource, ForecastResult, Record, RunConfig, SummaryMetric,
};
use crate::error::AppError;
use crate::forecast::forecast_series;
use crate::io::ingest::{ingest_csv, CleanedData};

/// All computed outputs of a single `epi run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub cleaned: CleanedData,
    /// The filtered country subset, chronological order.
    pub country: Vec<Record>,
    /// Rankings under the configured metric.
    pub rankings: Vec<CountrySummary>,
    /// Recovery-rate rankings; `None` when the column is absent (skip path).
    pub recovery_rankings: Option<Vec<CountrySummary>>,
    /// Forecast of the country's daily new cases. Kept as a `Result` so a
    /// model failure degrades to a note instead of aborting the run.
    pub forecast: Result<ForecastResult, AppError>,
}

/// Load the raw CSV text from the configured source.
pub fn load_csv(config: &RunConfig) -> Result<String, AppError> {
    match &config.source {
        DataSource::Remote => DatasetClient::from_env().fetch_csv(),
        DataSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
            AppError::new(2, format!("Failed to read CSV '{}': {e}", path.display()))
        }),
        DataSource::Sample { days, seed } => generate_sample_csv(*days, *seed),
    }
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let text = load_csv(config)?;
    run_pipeline_with_csv(config, &text)
}

/// Execute the pipeline on pre-loaded CSV text.
///
/// Useful for tests and for callers that already hold the dataset.
pub fn run_pipeline_with_csv(config: &RunConfig, text: &str) -> Result<RunOutput, AppError> {
    let cleaned = ingest_csv(text)?;

    if config.metric == SummaryMetric::Recovery && !cleaned.has_recovered {
        return Err(AppError::new(
            2,
            "Metric `recovery` requires a `total_recovered` column in the dataset.",
        ));
    }

    let country = filter_country(&cleaned.records, &config.country);

    let rankings = aggregate(
        &cleaned.records,
        config.metric,
        &config.exclusions,
        config.top_n,
    )?;

    let recovery_rankings = if cleaned.has_recovered {
        Some(aggregate(
            &cleaned.records,
            SummaryMetric::Recovery,
            &config.exclusions,
            config.top_n,
        )?)
    } else {
        None
    };

    let forecast = match country.last() {
        Some(last) => {
            let series: Vec<f64> = country.iter().map(|r| r.new_cases).collect();
            forecast_series(&series, config.horizon, last.date)
        }
        None => Err(AppError::new(
            3,
            format!("No rows for `{}`; nothing to forecast.", config.country),
        )),
    };

    Ok(RunOutput {
        cleaned,
        country,
        rankings,
        recovery_rankings,
        forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_EXCLUSIONS;

    fn config() -> RunConfig {
        RunConfig {
            source: DataSource::Sample { days: 120, seed: 42 },
            country: "India".to_string(),
            metric: SummaryMetric::Sum,
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            top_n: 10,
            horizon: 30,
            plot: false,
            plot_width: 80,
            plot_height: 15,
            export: None,
            export_forecast: None,
        }
    }

    #[test]
    fn full_pipeline_runs_on_synthetic_data() {
        let out = run_pipeline(&config()).unwrap();

        assert!(!out.country.is_empty());
        assert!(out.country.iter().all(|r| r.location == "India"));

        // Pseudo-locations excluded, descending order.
        assert!(out.rankings.iter().all(|s| s.location != "World"));
        for pair in out.rankings.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }

        // Synthetic data carries total_recovered, so the secondary variant runs.
        assert!(out.recovery_rankings.is_some());

        let forecast = out.forecast.unwrap();
        assert_eq!(forecast.point.len(), 30);
    }

    #[test]
    fn missing_country_degrades_forecast_without_failing_run() {
        let mut cfg = config();
        cfg.country = "Atlantis".to_string();

        let out = run_pipeline(&cfg).unwrap();
        assert!(out.country.is_empty());
        assert!(out.forecast.is_err());
        // Unrelated outputs still computed.
        assert!(!out.rankings.is_empty());
    }

    #[test]
    fn recovery_metric_without_column_fails_early() {
        let csv = "location,date,total_cases,new_cases,total_deaths,new_deaths\nIndia,2021-01-01,1,1,0,0\n";
        let mut cfg = config();
        cfg.metric = SummaryMetric::Recovery;

        let err = run_pipeline_with_csv(&cfg, csv).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn recovery_rankings_skipped_when_column_absent() {
        let csv = "\
location,date,total_cases,new_cases,total_deaths,new_deaths
India,2021-01-01,100,10,5,1
Brazil,2021-01-01,50,5,2,0
";
        let out = run_pipeline_with_csv(&config(), csv).unwrap();
        assert!(out.recovery_rankings.is_none());
        assert!(!out.rankings.is_empty());
    }
}

//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the dataset (remote, file, or synthetic)
//! - runs cleaning, filtering, aggregation, and forecasting
//! - prints reports/charts
//! - writes exports

use clap::Parser;

use crate::cli::{Command, RunArgs};
use crate::domain::{DataSource, RunConfig, SummaryMetric, DEFAULT_EXCLUSIONS};
use crate::error::AppError;
use crate::plot;
use crate::report;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Rank(args) => handle_rank(args),
        Command::Forecast(args) => handle_forecast(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_pipeline(&config)?;

    print!(
        "{}",
        report::format_run_summary(&run.cleaned, &config.country, &run.country)
    );
    print!("{}", report::format_rankings(&run.rankings, config.metric));

    match &run.forecast {
        Ok(forecast) => println!("{}", report::format_forecast_summary(&config.country, forecast)),
        Err(err) => println!("Forecast unavailable: {err}"),
    }

    if config.plot {
        print_charts(&config, &run);
    }

    if let Some(path) = &config.export {
        crate::io::export::write_cleaned_csv(path, &run.country)?;
        println!("Exported country subset to {}", path.display());
    }

    if let Some(path) = &config.export_forecast {
        // The export was explicitly requested, so a failed forecast is fatal here.
        let forecast = run.forecast.as_ref().map_err(Clone::clone)?;
        crate::io::forecast_file::write_forecast_json(path, &config.country, forecast)?;
        println!("Exported forecast to {}", path.display());
    }

    Ok(())
}

fn handle_rank(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let text = pipeline::load_csv(&config)?;
    let cleaned = crate::io::ingest::ingest_csv(&text)?;

    if config.metric == SummaryMetric::Recovery && !cleaned.has_recovered {
        return Err(AppError::new(
            2,
            "Metric `recovery` requires a `total_recovered` column in the dataset.",
        ));
    }

    let rankings = crate::analysis::aggregate(
        &cleaned.records,
        config.metric,
        &config.exclusions,
        config.top_n,
    )?;
    print!("{}", report::format_rankings(&rankings, config.metric));
    Ok(())
}

fn handle_forecast(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let text = pipeline::load_csv(&config)?;
    let cleaned = crate::io::ingest::ingest_csv(&text)?;
    let country = crate::analysis::filter_country(&cleaned.records, &config.country);

    let last = country.last().ok_or_else(|| {
        AppError::new(3, format!("No rows for `{}`; nothing to forecast.", config.country))
    })?;

    let series: Vec<f64> = country.iter().map(|r| r.new_cases).collect();
    let forecast = crate::forecast::forecast_series(&series, config.horizon, last.date)?;

    println!("{}", report::format_forecast_summary(&config.country, &forecast));
    if config.plot {
        print!(
            "{}",
            plot::render_forecast_chart(
                &format!("New cases forecast: {}", config.country),
                &series,
                &forecast,
                config.plot_width,
                config.plot_height,
            )
        );
    }

    if let Some(path) = &config.export_forecast {
        crate::io::forecast_file::write_forecast_json(path, &config.country, &forecast)?;
        println!("Exported forecast to {}", path.display());
    }

    Ok(())
}

/// Render the fixed chart sequence. Every chart is a pure function of an
/// already-computed stage output; the forecast chart degrades to a note.
fn print_charts(config: &RunConfig, run: &RunOutput) {
    let w = config.plot_width;
    let h = config.plot_height;
    let country = &config.country;

    let dates: Vec<_> = run.country.iter().map(|r| r.date).collect();
    let total_cases: Vec<f64> = run.country.iter().map(|r| r.total_cases).collect();
    let new_cases: Vec<f64> = run.country.iter().map(|r| r.new_cases).collect();
    let new_deaths: Vec<f64> = run.country.iter().map(|r| r.new_deaths).collect();
    let total_deaths: Vec<f64> = run.country.iter().map(|r| r.total_deaths).collect();

    print!(
        "{}",
        plot::render_line_chart(&format!("Total cases: {country}"), &dates, &total_cases, w, h)
    );
    print!(
        "{}",
        plot::render_line_chart(&format!("New cases: {country}"), &dates, &new_cases, w, h)
    );
    print!(
        "{}",
        plot::render_bar_chart(
            &format!("Top locations by {}", config.metric.display_name()),
            &run.rankings,
            w.min(60),
        )
    );

    match &run.forecast {
        Ok(forecast) => print!(
            "{}",
            plot::render_forecast_chart(
                &format!("New cases forecast: {country}"),
                &new_cases,
                forecast,
                w,
                h,
            )
        ),
        Err(err) => println!("New cases forecast: unavailable ({err})"),
    }

    print!(
        "{}",
        plot::render_dual_axis_chart(
            &format!("New cases (#) and new deaths (x): {country}"),
            &dates,
            &new_cases,
            &new_deaths,
            w,
            h,
        )
    );
    print!(
        "{}",
        plot::render_scatter_chart(
            &format!("Total cases vs total deaths: {country}"),
            "cases",
            "deaths",
            &total_cases,
            &total_deaths,
            w,
            h,
        )
    );

    // Conditional seventh chart, gated on the optional column.
    if let Some(recovery) = &run.recovery_rankings {
        print!(
            "{}",
            plot::render_bar_chart("Top locations by mean recovery rate", recovery, w.min(60))
        );
    }
}

/// Translate CLI flags into a validated `RunConfig`.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    if args.input.is_some() && args.sample {
        return Err(AppError::new(
            2,
            "`--input` and `--sample` are mutually exclusive.",
        ));
    }

    let source = if let Some(path) = &args.input {
        DataSource::File(path.clone())
    } else if args.sample {
        DataSource::Sample {
            days: args.sample_days,
            seed: args.seed,
        }
    } else {
        DataSource::Remote
    };

    let exclusions = if args.exclude.is_empty() {
        DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
    } else {
        args.exclude.clone()
    };

    Ok(RunConfig {
        source,
        country: args.country.clone(),
        metric: args.metric,
        exclusions,
        top_n: args.top,
        horizon: args.horizon,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: if args.no_export {
            None
        } else {
            Some(args.export.clone())
        },
        export_forecast: args.export_forecast.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_run(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["epi", "run"];
        argv.extend_from_slice(extra);
        match crate::cli::Cli::parse_from(argv).command {
            Command::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn default_config_targets_remote_source_and_default_exclusions() {
        let config = run_config_from_args(&parse_run(&[])).unwrap();
        assert_eq!(config.source, DataSource::Remote);
        assert_eq!(config.country, "India");
        assert_eq!(config.top_n, 10);
        assert_eq!(config.horizon, 30);
        assert!(config.exclusions.iter().any(|e| e == "World"));
        assert_eq!(
            config.export.as_deref(),
            Some(std::path::Path::new("cleaned_covid_data.csv"))
        );
    }

    #[test]
    fn explicit_exclusions_replace_defaults() {
        let config =
            run_config_from_args(&parse_run(&["--exclude", "World", "--exclude", "Asia"])).unwrap();
        assert_eq!(config.exclusions, vec!["World", "Asia"]);
    }

    #[test]
    fn input_and_sample_are_mutually_exclusive() {
        let err =
            run_config_from_args(&parse_run(&["--input", "data.csv", "--sample"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn no_export_suppresses_csv_export() {
        let config = run_config_from_args(&parse_run(&["--no-export"])).unwrap();
        assert!(config.export.is_none());
    }
}

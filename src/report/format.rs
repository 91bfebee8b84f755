//! Human-readable summaries of pipeline outputs.

use crate::domain::{CountrySummary, ForecastResult, Record, SummaryMetric};
use crate::io::ingest::CleanedData;

/// How many row-level ingest errors to print before truncating.
const MAX_ROW_ERRORS_SHOWN: usize = 5;

/// Dataset-level summary: row counts, ingest problems, optional-column note.
pub fn format_run_summary(cleaned: &CleanedData, country: &str, subset: &[Record]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Dataset: {} rows read, {} used, {} skipped\n",
        cleaned.rows_read,
        cleaned.rows_used,
        cleaned.row_errors.len()
    ));

    for err in cleaned.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        let loc = err.location.as_deref().unwrap_or("?");
        out.push_str(&format!("  line {} ({loc}): {}\n", err.line, err.message));
    }
    if cleaned.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more\n",
            cleaned.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }

    if !cleaned.has_recovered {
        out.push_str("Column `total_recovered` not found; skipping recovery-rate analysis.\n");
    }

    match (subset.first(), subset.last()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!(
                "Country `{country}`: {} rows, {}..{}\n",
                subset.len(),
                first.date,
                last.date
            ));
        }
        _ => {
            out.push_str(&format!("Country `{country}`: no matching rows.\n"));
        }
    }

    out
}

/// Ranking table for the aggregated summaries.
pub fn format_rankings(summaries: &[CountrySummary], metric: SummaryMetric) -> String {
    let mut out = format!(
        "Top {} locations by {}:\n",
        summaries.len(),
        metric.display_name()
    );

    if summaries.is_empty() {
        out.push_str("  (no locations after exclusions)\n");
        return out;
    }

    let label_width = summaries
        .iter()
        .map(|s| s.location.chars().count())
        .max()
        .unwrap_or(0);

    for (rank, s) in summaries.iter().enumerate() {
        let value = match metric {
            SummaryMetric::Recovery => format!("{:.3}", s.value),
            _ => format!("{:.0}", s.value),
        };
        out.push_str(&format!(
            "{:>3}. {:<label_width$}  {value}\n",
            rank + 1,
            s.location
        ));
    }

    out
}

/// One-line forecast description for terminal output.
pub fn format_forecast_summary(country: &str, forecast: &ForecastResult) -> String {
    let (p, d, q) = forecast.order;
    let last = forecast.point.last().copied().unwrap_or(0.0);
    format!(
        "Forecast for {country}: ARIMA({p},{d},{q}), sigma={:.2}, {} steps, final point {last:.0} on {}",
        forecast.sigma,
        forecast.point.len(),
        forecast.step_date(forecast.point.len().saturating_sub(1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::ingest_csv;

    #[test]
    fn summary_emits_skip_message_when_recovered_column_absent() {
        let csv = "location,date,total_cases,new_cases,total_deaths,new_deaths\nIndia,2021-01-01,1,1,0,0\n";
        let cleaned = ingest_csv(csv).unwrap();
        let out = format_run_summary(&cleaned, "India", &cleaned.records);
        assert!(out.contains("skipping recovery-rate analysis"));
    }

    #[test]
    fn summary_omits_skip_message_when_column_present() {
        let csv = "location,date,total_cases,new_cases,total_deaths,new_deaths,total_recovered\nIndia,2021-01-01,1,1,0,0,1\n";
        let cleaned = ingest_csv(csv).unwrap();
        let out = format_run_summary(&cleaned, "India", &cleaned.records);
        assert!(!out.contains("skipping recovery-rate analysis"));
    }

    #[test]
    fn rankings_table_lists_in_order() {
        let summaries = vec![
            CountrySummary {
                location: "Brazil".to_string(),
                value: 350.0,
                recovery_rate: None,
            },
            CountrySummary {
                location: "India".to_string(),
                value: 300.0,
                recovery_rate: None,
            },
        ];
        let out = format_rankings(&summaries, SummaryMetric::Sum);
        let brazil = out.find("Brazil").unwrap();
        let india = out.find("India").unwrap();
        assert!(brazil < india);
        assert!(out.contains("350"));
    }

    #[test]
    fn empty_rankings_render_a_note() {
        let out = format_rankings(&[], SummaryMetric::Sum);
        assert!(out.contains("no locations"));
    }
}

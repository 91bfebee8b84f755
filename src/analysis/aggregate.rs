//! Per-country aggregation and ranking.
//!
//! Grouping is by location (case-insensitive); the display name is the first
//! spelling seen. Ranking is descending by the chosen metric with location
//! name as a deterministic tie-break, then truncated to **strictly** `top_n`
//! rows. Strict truncation is deliberate: tie-inclusive top-N would make the
//! output length input-dependent.

use std::collections::HashMap;

use crate::domain::{CountrySummary, Record, SummaryMetric};
use crate::error::AppError;

#[derive(Default)]
struct Accumulator {
    display_name: String,
    sum_total_cases: f64,
    max_total_cases: f64,
    /// Sum and count of per-row recovery rates (rows with total_cases > 0).
    recovery_sum: f64,
    recovery_n: usize,
    saw_recovered: bool,
}

/// Group records by location, compute the metric, exclude pseudo-locations,
/// and return the top `top_n` summaries in descending metric order.
pub fn aggregate(
    records: &[Record],
    metric: SummaryMetric,
    exclusions: &[String],
    top_n: usize,
) -> Result<Vec<CountrySummary>, AppError> {
    let mut groups: HashMap<String, Accumulator> = HashMap::new();

    for r in records {
        let key = r.location.trim().to_ascii_lowercase();
        let acc = groups.entry(key).or_default();
        if acc.display_name.is_empty() {
            acc.display_name = r.location.trim().to_string();
        }

        acc.sum_total_cases += r.total_cases;
        acc.max_total_cases = acc.max_total_cases.max(r.total_cases);

        if let Some(recovered) = r.total_recovered {
            acc.saw_recovered = true;
            if r.total_cases > 0.0 {
                acc.recovery_sum += recovered / r.total_cases;
                acc.recovery_n += 1;
            }
        }
    }

    if metric == SummaryMetric::Recovery && !groups.values().any(|a| a.saw_recovered) {
        return Err(AppError::new(
            2,
            "Metric `recovery` requires a `total_recovered` column in the dataset.",
        ));
    }

    let excluded: Vec<String> = exclusions
        .iter()
        .map(|s| s.trim().to_ascii_lowercase())
        .collect();

    let mut summaries: Vec<CountrySummary> = groups
        .into_iter()
        .filter(|(key, _)| !excluded.iter().any(|e| e == key))
        .map(|(_, acc)| {
            let recovery_rate = if acc.recovery_n > 0 {
                Some(acc.recovery_sum / acc.recovery_n as f64)
            } else {
                None
            };
            let value = match metric {
                SummaryMetric::Sum => acc.sum_total_cases,
                SummaryMetric::Max => acc.max_total_cases,
                SummaryMetric::Recovery => recovery_rate.unwrap_or(0.0),
            };
            CountrySummary {
                location: acc.display_name,
                value,
                recovery_rate,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.location.cmp(&b.location))
    });
    summaries.truncate(top_n);

    Ok(summaries)
}

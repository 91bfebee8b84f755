//! CSV ingest and cleaning.
//!
//! This module turns the raw country-day CSV into a clean `Vec<Record>` that
//! is safe to aggregate and forecast.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Scoped missing-value handling**: only numeric cells are zero-filled;
//!   a row with no usable `location` or `date` is skipped, never zeroed
//! - **Separation of concerns**: no aggregation or forecasting logic here

use std::collections::HashMap;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::Record;
use crate::error::AppError;

const REQUIRED_COLUMNS: [&str; 6] = [
    "location",
    "date",
    "total_cases",
    "new_cases",
    "total_deaths",
    "new_deaths",
];

/// Optional column gating the recovery-rate analysis.
const RECOVERED_COLUMN: &str = "total_recovered";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub location: Option<String>,
    pub message: String,
}

/// Ingest output: cleaned records + column facts + row errors.
#[derive(Debug, Clone)]
pub struct CleanedData {
    /// Records in file order (chronological per location in the real feed).
    pub records: Vec<Record>,
    /// Whether the optional `total_recovered` column exists in the source.
    pub has_recovered: bool,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Parse and clean CSV text into records.
pub fn ingest_csv(text: &str) -> Result<CleanedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;
    let has_recovered = header_map.contains_key(RECOVERED_COLUMN);

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    location: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, has_recovered) {
            Ok(rec) => records.push(rec),
            Err((location, message)) => row_errors.push(RowError {
                line,
                location,
                message,
            }),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after cleaning."));
    }

    Ok(CleanedData {
        records,
        has_recovered,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report a missing `location` column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AppError::new(2, format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    has_recovered: bool,
) -> Result<Record, (Option<String>, String)> {
    let location = get_optional(record, header_map, "location")
        .map(str::to_string)
        .ok_or((None, "Missing `location` value.".to_string()))?;

    let date_str = get_optional(record, header_map, "date")
        .ok_or((Some(location.clone()), "Missing `date` value.".to_string()))?;
    let date = parse_date(date_str).map_err(|e| (Some(location.clone()), e))?;

    // Numeric cells: missing, blank, or unparseable values become 0.0. This is
    // the zero-fill from the cleaning step, scoped to numeric columns only.
    let total_cases = parse_numeric_or_zero(get_optional(record, header_map, "total_cases"));
    let new_cases = parse_numeric_or_zero(get_optional(record, header_map, "new_cases"));
    let total_deaths = parse_numeric_or_zero(get_optional(record, header_map, "total_deaths"));
    let new_deaths = parse_numeric_or_zero(get_optional(record, header_map, "new_deaths"));

    let total_recovered = if has_recovered {
        Some(parse_numeric_or_zero(get_optional(
            record,
            header_map,
            RECOVERED_COLUMN,
        )))
    } else {
        None
    };

    Ok(Record {
        location,
        date,
        total_cases,
        new_cases,
        total_deaths,
        new_deaths,
        total_recovered,
    })
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The feed uses ISO dates, but local re-exports sometimes come back in
    // day-first formats. Accept a small fixed set to keep parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_numeric_or_zero(s: Option<&str>) -> f64 {
    let Some(s) = s else { return 0.0 };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "\
location,date,total_cases,new_cases,total_deaths,new_deaths
India,2021-01-01,100,10,5,1
India,2021-01-02,110,10,6,1
Brazil,2021-01-01,50,5,2,0
";

    #[test]
    fn ingest_parses_required_columns() {
        let data = ingest_csv(GOOD).unwrap();
        assert_eq!(data.rows_used, 3);
        assert!(!data.has_recovered);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.records[0].location, "India");
        assert_eq!(data.records[0].total_cases, 100.0);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "location,date,total_cases\nIndia,2021-01-01,100\n";
        let err = ingest_csv(csv).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn numeric_cells_are_zero_filled_never_nan() {
        let csv = "\
location,date,total_cases,new_cases,total_deaths,new_deaths,total_recovered
India,2021-01-01,,abc,5,,
";
        let data = ingest_csv(csv).unwrap();
        let r = &data.records[0];
        assert_eq!(r.total_cases, 0.0);
        assert_eq!(r.new_cases, 0.0);
        assert_eq!(r.total_deaths, 5.0);
        assert_eq!(r.new_deaths, 0.0);
        assert_eq!(r.total_recovered, Some(0.0));
        for v in [r.total_cases, r.new_cases, r.total_deaths, r.new_deaths] {
            assert!(v.is_finite());
        }
    }

    #[test]
    fn bad_date_is_a_row_error_not_fatal() {
        let csv = "\
location,date,total_cases,new_cases,total_deaths,new_deaths
India,not-a-date,100,10,5,1
India,2021-01-02,110,10,6,1
";
        let data = ingest_csv(csv).unwrap();
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 2);
    }

    #[test]
    fn recovered_column_detected_when_present() {
        let csv = "\
location,date,total_cases,new_cases,total_deaths,new_deaths,total_recovered
India,2021-01-01,100,10,5,1,80
";
        let data = ingest_csv(csv).unwrap();
        assert!(data.has_recovered);
        assert_eq!(data.records[0].total_recovered, Some(80.0));
    }

    #[test]
    fn day_first_dates_are_accepted() {
        let csv = "\
location,date,total_cases,new_cases,total_deaths,new_deaths
India,02/01/2021,100,10,5,1
";
        let data = ingest_csv(csv).unwrap();
        assert_eq!(
            data.records[0].date,
            NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()
        );
    }

    #[test]
    fn bom_on_first_header_is_tolerated() {
        let csv = "\u{feff}location,date,total_cases,new_cases,total_deaths,new_deaths\nIndia,2021-01-01,1,1,0,0\n";
        let data = ingest_csv(csv).unwrap();
        assert_eq!(data.rows_used, 1);
    }

    #[test]
    fn all_rows_invalid_is_an_error() {
        let csv = "location,date,total_cases,new_cases,total_deaths,new_deaths\nIndia,bad,1,1,0,0\n";
        let err = ingest_csv(csv).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}

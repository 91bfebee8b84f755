//! Export the cleaned country subset to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: header row, the six core columns, dates as `YYYY-MM-DD`, no index
//! column. Any existing file at the path is overwritten.

use std::fs::File;
use std::path::Path;

use crate::domain::Record;
use crate::error::AppError;

/// Write records to a CSV file.
pub fn write_cleaned_csv(path: &Path, records: &[Record]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record([
            "location",
            "date",
            "total_cases",
            "new_cases",
            "total_deaths",
            "new_deaths",
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.location.as_str(),
                &r.date.to_string(),
                &format_count(r.total_cases),
                &format_count(r.new_cases),
                &format_count(r.total_deaths),
                &format_count(r.new_deaths),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}

/// Counts are whole numbers in practice; keep them integral in the export
/// unless the value genuinely has a fractional part.
fn format_count(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::ingest_csv;
    use chrono::NaiveDate;

    fn record(location: &str, day: u32, total: f64) -> Record {
        Record {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            total_cases: total,
            new_cases: 10.0,
            total_deaths: 2.0,
            new_deaths: 1.0,
            total_recovered: None,
        }
    }

    #[test]
    fn export_round_trips_through_ingest() {
        let records = vec![record("India", 1, 100.0), record("India", 2, 110.0)];

        let dir = std::env::temp_dir().join("epi_trends_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cleaned_covid_data.csv");

        write_cleaned_csv(&path, &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded = ingest_csv(&text).unwrap();

        assert_eq!(reloaded.rows_used, records.len());
        assert!(!reloaded.has_recovered);
        for (a, b) in reloaded.records.iter().zip(records.iter()) {
            assert_eq!(a.location, b.location);
            assert_eq!(a.date, b.date);
            assert_eq!(a.total_cases, b.total_cases);
            assert_eq!(a.new_cases, b.new_cases);
            assert_eq!(a.total_deaths, b.total_deaths);
            assert_eq!(a.new_deaths, b.new_deaths);
        }
    }

    #[test]
    fn export_overwrites_existing_file() {
        let dir = std::env::temp_dir().join("epi_trends_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("overwrite.csv");

        write_cleaned_csv(&path, &[record("India", 1, 100.0)]).unwrap();
        write_cleaned_csv(&path, &[record("Brazil", 1, 50.0)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Brazil"));
        assert!(!text.contains("India"));
    }

    #[test]
    fn counts_are_written_without_decimal_point() {
        let dir = std::env::temp_dir().join("epi_trends_export_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("integral.csv");

        write_cleaned_csv(&path, &[record("India", 1, 100.0)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("India,2021-01-01,100,10,2,1"));
    }
}

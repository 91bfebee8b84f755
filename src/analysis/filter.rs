//! Country subset extraction.

use crate::domain::Record;

/// Return the records whose `location` equals `name` (case-insensitive),
/// preserving input order.
///
/// A name matching nothing yields an empty Vec; that is not an error, and
/// downstream consumers render degenerate output with a note instead.
pub fn filter_country(records: &[Record], name: &str) -> Vec<Record> {
    let name = name.trim();
    records
        .iter()
        .filter(|r| r.location.trim().eq_ignore_ascii_case(name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(location: &str, day: u32) -> Record {
        Record {
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            total_cases: 0.0,
            new_cases: 0.0,
            total_deaths: 0.0,
            new_deaths: 0.0,
            total_recovered: None,
        }
    }

    #[test]
    fn filter_preserves_order_and_matches_case_insensitively() {
        let records = vec![record("India", 1), record("Brazil", 1), record("India", 2)];
        let out = filter_country(&records, "india");
        assert_eq!(out.len(), 2);
        assert!(out[0].date < out[1].date);
    }

    #[test]
    fn nonexistent_country_yields_empty_not_error() {
        let records = vec![record("India", 1)];
        let out = filter_country(&records, "Atlantis");
        assert!(out.is_empty());
    }
}

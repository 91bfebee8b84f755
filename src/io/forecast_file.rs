//! Read/write forecast JSON files.
//!
//! Forecast JSON is the "portable" representation of a fitted forecast:
//! - selected (p, d, q) order and fit diagnostics
//! - point forecasts plus the 95% interval
//! - the last observed date, so steps can be re-dated on reload
//!
//! The schema is defined by `domain::ForecastFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{ForecastFile, ForecastResult};
use crate::error::AppError;

/// Write a forecast JSON file.
pub fn write_forecast_json(
    path: &Path,
    location: &str,
    forecast: &ForecastResult,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create forecast JSON '{}': {e}", path.display()),
        )
    })?;

    let out = ForecastFile {
        tool: "epi".to_string(),
        location: location.to_string(),
        horizon: forecast.point.len(),
        forecast: forecast.clone(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::new(2, format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Read a forecast JSON file.
pub fn read_forecast_json(path: &Path) -> Result<ForecastFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open forecast JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid forecast JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn forecast_json_round_trip() {
        let forecast = ForecastResult {
            order: (1, 1, 0),
            point: vec![10.0, 11.0, 12.0],
            lower: vec![8.0, 8.5, 9.0],
            upper: vec![12.0, 13.5, 15.0],
            sigma: 1.5,
            aicc: 42.0,
            last_date: NaiveDate::from_ymd_opt(2021, 6, 30).unwrap(),
        };

        let dir = std::env::temp_dir().join("epi_trends_forecast_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("forecast.json");

        write_forecast_json(&path, "India", &forecast).unwrap();
        let loaded = read_forecast_json(&path).unwrap();

        assert_eq!(loaded.tool, "epi");
        assert_eq!(loaded.location, "India");
        assert_eq!(loaded.horizon, 3);
        assert_eq!(loaded.forecast.order, (1, 1, 0));
        assert_eq!(loaded.forecast.point, forecast.point);
        assert_eq!(
            loaded.forecast.step_date(0),
            NaiveDate::from_ymd_opt(2021, 7, 1).unwrap()
        );
    }
}

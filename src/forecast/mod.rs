//! Univariate forecasting: ARIMA fitting and automatic order selection.

pub mod arima;
pub mod selection;

use chrono::NaiveDate;

use crate::domain::ForecastResult;
use crate::error::AppError;

/// Fit an automatically selected ARIMA model to a daily series and forecast
/// `horizon` steps ahead.
///
/// The series is one country's `new_cases` values ordered by date, assumed
/// daily and gapless. See `selection::fit_and_select` for the order search
/// and the degenerate-series rule.
pub fn forecast_series(
    series: &[f64],
    horizon: usize,
    last_date: NaiveDate,
) -> Result<ForecastResult, AppError> {
    let selected = selection::fit_and_select(series)?;
    let band = selected.forecast(horizon)?;

    Ok(ForecastResult {
        order: selected.order(),
        point: band.point,
        lower: band.lower,
        upper: band.upper,
        sigma: selected.sigma(),
        aicc: selected.aicc(),
        last_date,
    })
}

//! Automatic ARIMA order selection.
//!
//! The search fits every order in a fixed (p, d, q) grid and scores each fit
//! with AICc. Selection rules:
//!
//! 1. Degenerate (constant) series short-circuit to a flat forecast — the
//!    deterministic behavior chosen for all-zero or constant inputs.
//! 2. Candidates that fail to fit are skipped; if every candidate fails, the
//!    error propagates.
//! 3. Minimum AICc wins; ties prefer fewer parameters, then the
//!    lexicographically smaller order, so the result is deterministic.
//!
//! The source dataset tags the series with a 365-day annual period, but with
//! well under two full periods of data a seasonal search cannot estimate
//! anything, so selection here is non-seasonal.

use rayon::prelude::*;

use crate::error::AppError;
use crate::forecast::arima::{ArimaFit, ForecastBand};

/// Minimum observations before any model selection is attempted.
pub const MIN_OBSERVATIONS: usize = 30;

const MAX_P: usize = 5;
const MAX_D: usize = 2;
const MAX_Q: usize = 5;

/// Tolerance below which a series is treated as constant.
const CONSTANT_EPS: f64 = 1e-9;

/// The winning model of the order search.
#[derive(Debug, Clone)]
pub enum SelectedModel {
    /// Constant input: forecast is flat at the observed level with zero-width
    /// intervals.
    Flat { level: f64 },
    Arima(ArimaFit),
}

impl SelectedModel {
    pub fn order(&self) -> (usize, usize, usize) {
        match self {
            SelectedModel::Flat { .. } => (0, 0, 0),
            SelectedModel::Arima(fit) => fit.order(),
        }
    }

    pub fn sigma(&self) -> f64 {
        match self {
            SelectedModel::Flat { .. } => 0.0,
            SelectedModel::Arima(fit) => fit.sigma(),
        }
    }

    pub fn aicc(&self) -> f64 {
        match self {
            SelectedModel::Flat { .. } => 0.0,
            SelectedModel::Arima(fit) => fit.aicc(),
        }
    }

    pub fn forecast(&self, horizon: usize) -> Result<ForecastBand, AppError> {
        match self {
            SelectedModel::Flat { level } => {
                let point = vec![*level; horizon];
                Ok(ForecastBand {
                    lower: point.clone(),
                    upper: point.clone(),
                    point,
                })
            }
            SelectedModel::Arima(fit) => fit.forecast(horizon),
        }
    }
}

/// Search the order grid and return the best model.
pub fn fit_and_select(series: &[f64]) -> Result<SelectedModel, AppError> {
    if series.len() < MIN_OBSERVATIONS {
        return Err(AppError::new(
            3,
            format!(
                "Series too short to forecast: need at least {MIN_OBSERVATIONS} observations, have {}.",
                series.len()
            ),
        ));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Series contains non-finite values."));
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < CONSTANT_EPS {
        return Ok(SelectedModel::Flat { level: max });
    }

    let orders: Vec<(usize, usize, usize)> = (0..=MAX_P)
        .flat_map(|p| (0..=MAX_D).flat_map(move |d| (0..=MAX_Q).map(move |q| (p, d, q))))
        .collect();

    // The grid is embarrassingly parallel; each candidate fit is independent.
    let mut fits: Vec<ArimaFit> = orders
        .par_iter()
        .filter_map(|&(p, d, q)| ArimaFit::fit(series, p, d, q).ok())
        .collect();

    if fits.is_empty() {
        return Err(AppError::new(
            4,
            "No ARIMA order could be fitted to the series.",
        ));
    }

    // Deterministic winner regardless of parallel collection order.
    fits.sort_by(|a, b| {
        a.aicc()
            .partial_cmp(&b.aicc())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| param_count(a).cmp(&param_count(b)))
            .then_with(|| a.order().cmp(&b.order()))
    });

    Ok(SelectedModel::Arima(fits.remove(0)))
}

fn param_count(fit: &ArimaFit) -> usize {
    let (p, _, q) = fit.order();
    p + q + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_constant_zeros_yield_flat_zero_forecast() {
        let series = vec![0.0; 40];
        let model = fit_and_select(&series).unwrap();
        assert_eq!(model.order(), (0, 0, 0));

        let band = model.forecast(30).unwrap();
        assert_eq!(band.point.len(), 30);
        assert!(band.point.iter().all(|&v| v == 0.0));
        // Zero-width interval.
        assert_eq!(band.lower, band.point);
        assert_eq!(band.upper, band.point);
    }

    #[test]
    fn constant_nonzero_series_forecasts_the_level() {
        let series = vec![7.0; 35];
        let model = fit_and_select(&series).unwrap();
        let band = model.forecast(5).unwrap();
        assert!(band.point.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn short_series_is_rejected() {
        let series: Vec<f64> = (0..(MIN_OBSERVATIONS - 1)).map(|t| t as f64).collect();
        let err = fit_and_select(&series).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn trending_series_selects_a_model_and_forecasts_upward() {
        let series: Vec<f64> = (0..90).map(|t| 10.0 + 2.0 * t as f64).collect();
        let model = fit_and_select(&series).unwrap();
        let band = model.forecast(10).unwrap();

        let last = *series.last().unwrap();
        // The forecast should continue well above the last observation.
        assert!(band.point[9] > last);
    }

    #[test]
    fn selection_is_deterministic() {
        let series: Vec<f64> = (0..60)
            .map(|t| 100.0 + (t as f64 * 0.5).sin() * 20.0 + t as f64)
            .collect();
        let a = fit_and_select(&series).unwrap();
        let b = fit_and_select(&series).unwrap();
        assert_eq!(a.order(), b.order());
    }
}

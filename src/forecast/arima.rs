//! ARIMA(p,d,q) fitting and prediction.
//!
//! The estimation strategy is deliberately simple and deterministic:
//!
//! - **I**: difference the series `d` times.
//! - **AR**: conditional least squares — regress the differenced series on its
//!   own `p` lags plus an intercept (solved in `math::ols`).
//! - **MA**: moment estimates from the autocorrelation of the AR residuals,
//!   clamped to (-0.99, 0.99) for stability.
//!
//! Prediction intervals come from the psi-weight recursion on the fitted ARMA
//! coefficients, with a prefix-sum per differencing level to account for
//! integration.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;
use crate::math::ols::solve_least_squares;

/// Normal quantile for a 95% interval.
const Z_95: f64 = 1.96;

/// Point forecast plus interval bounds, all of length `horizon`.
#[derive(Debug, Clone)]
pub struct ForecastBand {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// A fitted ARIMA model.
#[derive(Debug, Clone)]
pub struct ArimaFit {
    p: usize,
    d: usize,
    q: usize,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Intercept of the AR regression on the differenced scale.
    constant: f64,
    sigma2: f64,
    aicc: f64,
    /// Last value of the series at each differencing level 0..d, used to
    /// integrate forecasts back to the original scale.
    level_tails: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
}

impl ArimaFit {
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma2.sqrt()
    }

    pub fn aicc(&self) -> f64 {
        self.aicc
    }

    /// Fit an ARIMA(p,d,q) model by conditional least squares.
    pub fn fit(series: &[f64], p: usize, d: usize, q: usize) -> Result<Self, AppError> {
        if p > 10 || q > 10 {
            return Err(AppError::new(2, "AR/MA order must be <= 10."));
        }
        if d > 2 {
            return Err(AppError::new(2, "Differencing order must be <= 2."));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(AppError::new(4, "Series contains non-finite values."));
        }

        let min_len = p + d + q + 10;
        if series.len() < min_len {
            return Err(AppError::new(
                3,
                format!(
                    "Series too short for ARIMA({p},{d},{q}): need {min_len}, have {}.",
                    series.len()
                ),
            ));
        }

        let (differenced, level_tails) = difference(series, d);
        let n = differenced.len();

        let (constant, ar) = if p == 0 {
            let mean = differenced.iter().sum::<f64>() / n as f64;
            (mean, Vec::new())
        } else {
            estimate_ar(&differenced, p)?
        };

        // One-step-ahead residuals of the AR stage (undefined for t < p).
        let mut residuals = vec![0.0; n];
        for t in p..n {
            let mut pred = constant;
            for (i, &phi) in ar.iter().enumerate() {
                pred += phi * differenced[t - i - 1];
            }
            residuals[t] = differenced[t] - pred;
        }

        let ma = estimate_ma(&residuals[p..], q);

        let m = n - p;
        let k = p + q + 1;
        if m <= k + 1 {
            return Err(AppError::new(
                3,
                format!("Too few effective observations for ARIMA({p},{d},{q})."),
            ));
        }

        let sigma2 = (residuals[p..].iter().map(|r| r * r).sum::<f64>() / m as f64).max(1e-12);

        let m_f = m as f64;
        let k_f = k as f64;
        let aicc = m_f * sigma2.ln() + 2.0 * k_f + 2.0 * k_f * (k_f + 1.0) / (m_f - k_f - 1.0);
        if !aicc.is_finite() {
            return Err(AppError::new(4, "Model scoring produced a non-finite value."));
        }

        Ok(Self {
            p,
            d,
            q,
            ar,
            ma,
            constant,
            sigma2,
            aicc,
            level_tails,
            differenced,
            residuals,
        })
    }

    /// Forecast `horizon` steps ahead on the original scale, with a 95%
    /// prediction interval.
    pub fn forecast(&self, horizon: usize) -> Result<ForecastBand, AppError> {
        if horizon == 0 {
            return Ok(ForecastBand {
                point: Vec::new(),
                lower: Vec::new(),
                upper: Vec::new(),
            });
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut extended_residuals = self.residuals.clone();

        for _ in 0..horizon {
            let mut f = self.constant;
            for (j, &phi) in self.ar.iter().enumerate() {
                f += phi * extended[extended.len() - j - 1];
            }
            for (j, &theta) in self.ma.iter().enumerate() {
                if extended_residuals.len() > j {
                    f += theta * extended_residuals[extended_residuals.len() - j - 1];
                }
            }
            extended.push(f);
            extended_residuals.push(0.0); // future shocks are zero in expectation
        }

        let point = self.integrate(&extended[n..]);

        let psi = self.integrated_psi_weights(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut var_sum = 0.0;
        for (h, &f) in point.iter().enumerate() {
            var_sum += psi[h] * psi[h];
            let half_width = Z_95 * (self.sigma2 * var_sum).sqrt();
            if !half_width.is_finite() {
                return Err(AppError::new(4, "Non-finite prediction interval."));
            }
            lower.push(f - half_width);
            upper.push(f + half_width);
        }

        Ok(ForecastBand { point, lower, upper })
    }

    /// Undo the differencing: cumulative sums seeded with the stored tail
    /// value of each level, innermost level first.
    fn integrate(&self, forecasts: &[f64]) -> Vec<f64> {
        let mut result = forecasts.to_vec();
        for level in (0..self.d).rev() {
            let mut acc = self.level_tails[level];
            for v in result.iter_mut() {
                acc += *v;
                *v = acc;
            }
        }
        result
    }

    /// Psi weights of the integrated process up to `horizon` terms.
    ///
    /// ARMA recursion: psi_0 = 1, psi_j = theta_j + Σ_{i=1..min(j,p)} phi_i psi_{j-i},
    /// then one prefix-sum per differencing level.
    fn integrated_psi_weights(&self, horizon: usize) -> Vec<f64> {
        let mut psi = vec![0.0; horizon];
        psi[0] = 1.0;
        for j in 1..horizon {
            let mut v = if j <= self.q { self.ma[j - 1] } else { 0.0 };
            for i in 1..=j.min(self.p) {
                v += self.ar[i - 1] * psi[j - i];
            }
            psi[j] = v;
        }

        for _ in 0..self.d {
            for j in 1..horizon {
                psi[j] += psi[j - 1];
            }
        }

        psi
    }
}

/// Difference `order` times; also return the last value of each intermediate
/// level (level 0 = original) for later integration.
fn difference(series: &[f64], order: usize) -> (Vec<f64>, Vec<f64>) {
    let mut current = series.to_vec();
    let mut tails = Vec::with_capacity(order);
    for _ in 0..order {
        tails.push(*current.last().expect("non-empty series"));
        let mut next = Vec::with_capacity(current.len().saturating_sub(1));
        for i in 1..current.len() {
            next.push(current[i] - current[i - 1]);
        }
        current = next;
    }
    (current, tails)
}

/// AR coefficients by least squares regression on `p` lags plus an intercept.
fn estimate_ar(differenced: &[f64], p: usize) -> Result<(f64, Vec<f64>), AppError> {
    let n = differenced.len();
    let rows = n - p;
    let cols = p + 1;

    let mut x = DMatrix::zeros(rows, cols);
    let mut y = DVector::zeros(rows);
    for t in p..n {
        let row = t - p;
        x[(row, 0)] = 1.0;
        for i in 0..p {
            x[(row, i + 1)] = differenced[t - i - 1];
        }
        y[row] = differenced[t];
    }

    let beta = solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::new(4, "AR regression is too ill-conditioned to solve."))?;

    let constant = beta[0];
    let ar = (0..p).map(|i| beta[i + 1]).collect();
    Ok((constant, ar))
}

/// MA coefficients from the autocorrelation of the AR residuals.
fn estimate_ma(residuals: &[f64], q: usize) -> Vec<f64> {
    if q == 0 || residuals.is_empty() {
        return vec![0.0; q];
    }

    let n = residuals.len();
    let mean = residuals.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = residuals.iter().map(|r| r - mean).collect();
    let var = centered.iter().map(|r| r * r).sum::<f64>() / n as f64;

    let mut coeffs = vec![0.0; q];
    if var.abs() > 1e-10 {
        for k in 0..q {
            let mut sum = 0.0;
            for i in (k + 1)..n {
                sum += centered[i] * centered[i - k - 1];
            }
            coeffs[k] = ((sum / n as f64) / var).clamp(-0.99, 0.99);
        }
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_rejects_short_series() {
        let series = vec![1.0; 5];
        let err = ArimaFit::fit(&series, 1, 1, 0).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn drifted_series_forecast_continues_the_trend() {
        // x_t = t: first difference is constant 1, so ARIMA(0,1,0) should
        // forecast a continued unit slope.
        let series: Vec<f64> = (0..60).map(|t| t as f64).collect();
        let fit = ArimaFit::fit(&series, 0, 1, 0).unwrap();
        let band = fit.forecast(5).unwrap();

        assert_eq!(band.point.len(), 5);
        for (i, &f) in band.point.iter().enumerate() {
            let expected = 59.0 + (i as f64 + 1.0);
            assert!((f - expected).abs() < 1e-6, "step {i}: {f} vs {expected}");
        }
    }

    #[test]
    fn interval_width_is_non_decreasing() {
        let series: Vec<f64> = (0..80)
            .map(|t| 50.0 + (t as f64 * 0.3).sin() * 10.0 + t as f64)
            .collect();
        let fit = ArimaFit::fit(&series, 1, 1, 1).unwrap();
        let band = fit.forecast(10).unwrap();

        let widths: Vec<f64> = band
            .upper
            .iter()
            .zip(band.lower.iter())
            .map(|(u, l)| u - l)
            .collect();
        for pair in widths.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-9);
        }
    }

    #[test]
    fn zero_horizon_yields_empty_band() {
        let series: Vec<f64> = (0..40).map(|t| t as f64).collect();
        let fit = ArimaFit::fit(&series, 1, 0, 0).unwrap();
        let band = fit.forecast(0).unwrap();
        assert!(band.point.is_empty());
    }

    #[test]
    fn second_difference_integrates_back_correctly() {
        // Quadratic series: second difference is constant 2.
        let series: Vec<f64> = (0..50).map(|t| (t * t) as f64).collect();
        let fit = ArimaFit::fit(&series, 0, 2, 0).unwrap();
        let band = fit.forecast(3).unwrap();

        // Next values of t^2 at t = 50, 51, 52.
        let expected = [2500.0, 2601.0, 2704.0];
        for (f, e) in band.point.iter().zip(expected.iter()) {
            assert!((f - e).abs() < 1e-6, "{f} vs {e}");
        }
    }
}

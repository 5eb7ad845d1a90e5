//! # Regression Module
//!
//! Closed-form ordinary least squares for a straight line, checked against
//! the `linreg` crate as an independent reference fit.

use crate::error::{LabError, Result};
use linreg::linear_regression;
use rand::SeedableRng;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use serde::Serialize;
use statrs::distribution::Normal;
use std::fmt;

/// A fitted (or true) line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LineFit {
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    pub fn evaluate(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.at(x)).collect()
    }
}

impl fmt::Display for LineFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "β0 = {:.4}, β1 = {:.4}", self.intercept, self.slope)
    }
}

fn check_pairs(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(LabError::degenerate(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(LabError::degenerate("a line needs at least 2 points"));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(LabError::degenerate("samples contain non-finite values"));
    }
    Ok(())
}

/// Fits a line with the closed-form OLS estimates
/// `β1 = Σ(x-x̄)(y-ȳ) / Σ(x-x̄)²` and `β0 = ȳ - β1·x̄`.
///
/// Fails when every x is (numerically) the same value.
pub fn least_squares_fit(x: &[f64], y: &[f64]) -> Result<LineFit> {
    check_pairs(x, y)?;
    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let (numerator, denominator) = x.iter().zip(y).fold((0.0, 0.0), |(num, den), (&xi, &yi)| {
        let dx = xi - x_mean;
        (num + dx * (yi - y_mean), den + dx * dx)
    });

    // Centring x near `max|x|` carries rounding error of a few ulps per
    // value; a spread below that floor is indistinguishable from none.
    let magnitude = x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let rounding_floor = n * (4.0 * f64::EPSILON * magnitude).powi(2);
    let constant = x.iter().all(|&v| v == x[0]);
    if constant || denominator <= rounding_floor {
        return Err(LabError::degenerate("x has zero variance; slope is undefined"));
    }

    let slope = numerator / denominator;
    Ok(LineFit::new(y_mean - slope * x_mean, slope))
}

/// Degree-1 polynomial fit computed by the `linreg` crate.
pub fn reference_fit(x: &[f64], y: &[f64]) -> Result<LineFit> {
    check_pairs(x, y)?;
    let (slope, intercept) = linear_regression::<_, _, f64>(x, y)
        .map_err(|e| LabError::degenerate(format!("reference fit failed: {:?}", e)))?;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(LabError::degenerate("reference fit is not finite"));
    }
    Ok(LineFit::new(intercept, slope))
}

/// Paired samples scattered around a known line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSample {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub truth: LineFit,
}

/// Generates `points` evenly spaced x values over `[0, x_max]` and
/// `y = truth(x) + Normal(0, noise_sd)` with a seeded generator.
pub fn synthetic_line(truth: LineFit, points: usize, x_max: f64, noise_sd: f64, seed: u64) -> Result<LineSample> {
    if points < 2 {
        return Err(LabError::degenerate("a line needs at least 2 points"));
    }
    if !x_max.is_finite() || !noise_sd.is_finite() || noise_sd < 0.0 {
        return Err(LabError::degenerate("x_max and noise_sd must be finite, noise_sd non-negative"));
    }
    let step = x_max / (points - 1) as f64;
    let mut x: Vec<f64> = (0..points).map(|i| i as f64 * step).collect();
    x[points - 1] = x_max;

    let y = if noise_sd == 0.0 {
        truth.evaluate(&x)
    } else {
        let normal = Normal::new(0.0, noise_sd)
            .map_err(|e| LabError::degenerate(format!("noise distribution: {}", e)))?;
        let mut rng = StdRng::seed_from_u64(seed);
        x.iter().map(|&xi| truth.at(xi) + normal.sample(&mut rng)).collect()
    };

    Ok(LineSample { x, y, truth })
}

/// Both fits over one sample, for printing and plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    pub sample: LineSample,
    pub own: LineFit,
    pub reference: LineFit,
}

impl RegressionReport {
    pub fn compute(sample: LineSample) -> Result<Self> {
        let own = least_squares_fit(&sample.x, &sample.y)?;
        let reference = reference_fit(&sample.x, &sample.y)?;
        Ok(Self { sample, own, reference })
    }

    /// True when both fits agree on slope and intercept within `tolerance`.
    pub fn agrees(&self, tolerance: f64) -> bool {
        (self.own.slope - self.reference.slope).abs() <= tolerance
            && (self.own.intercept - self.reference.intercept).abs() <= tolerance
    }
}

impl fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Least squares (own implementation): {}", self.own)?;
        writeln!(f, "Reference polynomial fit:           {}", self.reference)?;
        write!(f, "True line:                          {}", self.sample.truth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line_is_recovered() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.5, 6.0, 8.5];
        let fit = least_squares_fit(&x, &y).unwrap();
        assert!((fit.slope - 2.5).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_x_is_degenerate() {
        let err = least_squares_fit(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.is_degenerate());
        assert!(least_squares_fit(&[2.0, 2.0], &[1.0, 5.0]).is_err());
    }

    #[test]
    fn test_offset_x_is_not_degenerate() {
        let x = [1e9, 1e9 + 1.0, 1e9 + 2.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * (v - 1e9) + 1.0).collect();
        let own = least_squares_fit(&x, &y).unwrap();
        let reference = reference_fit(&x, &y).unwrap();
        assert!((own.slope - 2.0).abs() < 1e-9);
        assert!((own.intercept + 1_999_999_999.0).abs() < 1e-3);
        assert!((own.slope - reference.slope).abs() < 1e-9);
        assert!((own.intercept - reference.intercept).abs() < 1e-3);
    }

    #[test]
    fn test_bad_shapes_are_degenerate() {
        assert!(least_squares_fit(&[1.0], &[1.0]).is_err());
        assert!(least_squares_fit(&[1.0, 2.0], &[1.0]).is_err());
        assert!(reference_fit(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_synthetic_sample_is_reproducible() {
        let truth = LineFit::new(1.0, 2.5);
        let a = synthetic_line(truth, 50, 10.0, 1.0, 42).unwrap();
        let b = synthetic_line(truth, 50, 10.0, 1.0, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.x.len(), 50);
        assert_eq!(a.x[49], 10.0);
    }

    #[test]
    fn test_report_fits_agree_on_noisy_data() {
        let sample = synthetic_line(LineFit::new(1.0, 2.5), 50, 10.0, 1.0, 42).unwrap();
        let report = RegressionReport::compute(sample).unwrap();
        assert!(report.agrees(1e-9));
        // 50 points with unit noise keep the slope close to the truth.
        assert!((report.own.slope - 2.5).abs() < 0.3);
    }
}

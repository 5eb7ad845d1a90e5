//! Agreement between the closed-form fit and the reference fit.

use labkit_core::config::RegressionConfig;
use labkit_core::regression::{LineFit, RegressionReport, least_squares_fit, reference_fit, synthetic_line};

#[test]
fn noiseless_lines_are_recovered_by_both_fits() {
    for (slope, intercept) in [(2.5, 1.0), (-0.75, 12.0), (0.0, -3.0), (1e3, 1e-3)] {
        let sample = synthetic_line(LineFit::new(intercept, slope), 50, 10.0, 0.0, 0).unwrap();
        for fit in [
            least_squares_fit(&sample.x, &sample.y).unwrap(),
            reference_fit(&sample.x, &sample.y).unwrap(),
        ] {
            assert!((fit.slope - slope).abs() < 1e-6, "slope {} vs {}", fit.slope, slope);
            assert!((fit.intercept - intercept).abs() < 1e-6, "intercept {} vs {}", fit.intercept, intercept);
        }
    }
}

#[test]
fn default_configuration_fits_agree() {
    let cfg = RegressionConfig::default();
    let report = RegressionReport::compute(cfg.sample().unwrap()).unwrap();
    assert!(report.agrees(cfg.tolerance));
    assert_eq!(report.sample.truth, LineFit::new(1.0, 2.5));
    let printed = report.to_string();
    assert!(printed.contains("own implementation"));
    assert!(printed.contains("β1 = 2.5000"));
}

#[test]
fn constant_x_fails_in_both_fits() {
    let x = [4.0; 10];
    let y: Vec<f64> = (0..10).map(f64::from).collect();
    assert!(least_squares_fit(&x, &y).unwrap_err().is_degenerate());
    assert!(reference_fit(&x, &y).is_err());
}

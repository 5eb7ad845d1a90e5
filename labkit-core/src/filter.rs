//! # Low-Pass Filter Module
//!
//! Zero-phase Butterworth low-pass filtering for the signal demos.
//!
//! ## Features
//! - Digital Butterworth design through the bilinear transform with
//!   frequency prewarping, expressed as cascaded second-order sections
//! - Forward-backward application (zero phase, squared magnitude response)
//! - Odd-extension padding and steady-state initial conditions to keep
//!   the edges free of start-up transients
//!
//! Coefficients are designed on every call; nothing is cached.

use crate::error::{LabError, Result};
use std::f64::consts::PI;

/// One second-order section, normalised so that `a[0] == 1`.
/// First-order sections carry zero in `b[2]` and `a[2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    /// Gain at 0 Hz.
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    fn is_first_order(&self) -> bool {
        self.b[2] == 0.0 && self.a[2] == 0.0
    }

    /// Delay-line state after settling on a unit step input.
    fn steady_state(&self) -> [f64; 2] {
        let g = self.dc_gain();
        let z1 = self.b[2] - self.a[2] * g;
        let z0 = self.b[1] - self.a[1] * g + z1;
        [z0, z1]
    }

    /// Runs the section in place (transposed direct form II).
    fn run(&self, signal: &mut [f64], mut z: [f64; 2]) {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        for sample in signal.iter_mut() {
            let x = *sample;
            let y = b0 * x + z[0];
            z[0] = b1 * x - a1 * y + z[1];
            z[1] = b2 * x - a2 * y;
            *sample = y;
        }
    }
}

/// Designs a digital Butterworth low-pass filter.
///
/// # Arguments
/// * `order` - Filter order (number of poles), at least 1
/// * `cutoff_hz` - -3 dB frequency, strictly between 0 and Nyquist
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `ceil(order / 2)` cascaded sections
pub fn butterworth_lowpass(order: usize, cutoff_hz: f64, sample_rate: f64) -> Result<Vec<Biquad>> {
    if order == 0 {
        return Err(LabError::degenerate("filter order must be at least 1"));
    }
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(LabError::degenerate(format!("invalid sample rate {}", sample_rate)));
    }
    let nyquist = sample_rate / 2.0;
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
        return Err(LabError::degenerate(format!(
            "cutoff {:.3} Hz must lie strictly between 0 and Nyquist ({:.3} Hz)",
            cutoff_hz, nyquist
        )));
    }

    // Prewarped analog cutoff, folded into the bilinear transform.
    let k = (PI * cutoff_hz / sample_rate).tan();
    let k2 = k * k;

    let mut sections = Vec::with_capacity(order.div_ceil(2));
    for i in 0..order / 2 {
        let q = 1.0 / (2.0 * (PI * (2 * i + 1) as f64 / (2 * order) as f64).sin());
        let norm = 1.0 / (1.0 + k / q + k2);
        let b0 = k2 * norm;
        sections.push(Biquad {
            b: [b0, 2.0 * b0, b0],
            a: [1.0, 2.0 * (k2 - 1.0) * norm, (1.0 - k / q + k2) * norm],
        });
    }
    if order % 2 == 1 {
        let norm = 1.0 / (1.0 + k);
        sections.push(Biquad {
            b: [k * norm, k * norm, 0.0],
            a: [1.0, (k - 1.0) * norm, 0.0],
        });
    }
    Ok(sections)
}

/// Number of samples mirrored onto each end before filtering.
fn pad_length(sections: &[Biquad]) -> usize {
    let first_order = sections.iter().filter(|s| s.is_first_order()).count();
    3 * (2 * sections.len() + 1 - first_order)
}

/// Odd extension: point-reflects `n` samples about each endpoint.
fn odd_extend(signal: &[f64], n: usize) -> Vec<f64> {
    let len = signal.len();
    let first = signal[0];
    let last = signal[len - 1];
    let mut out = Vec::with_capacity(len + 2 * n);
    out.extend((1..=n).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=n).map(|i| 2.0 * last - signal[len - 1 - i]));
    out
}

/// Runs the cascade once, starting every section in the steady state of
/// a constant input equal to `signal[0]`.
fn cascade(sections: &[Biquad], signal: &mut [f64]) {
    let x0 = signal[0];
    let mut scale = 1.0;
    for section in sections {
        let [z0, z1] = section.steady_state();
        section.run(signal, [z0 * scale * x0, z1 * scale * x0]);
        scale *= section.dc_gain();
    }
}

/// Applies `sections` forward and then backward over `signal`.
///
/// The output has exactly as many samples as the input. Signals that are
/// not longer than the edge padding cannot be filtered.
pub fn filtfilt(sections: &[Biquad], signal: &[f64]) -> Result<Vec<f64>> {
    if sections.is_empty() {
        return Err(LabError::degenerate("filter has no sections"));
    }
    let pad = pad_length(sections);
    if signal.len() <= pad {
        return Err(LabError::degenerate(format!(
            "signal of {} samples is too short to filter (needs more than {})",
            signal.len(),
            pad
        )));
    }
    if signal.iter().any(|s| !s.is_finite()) {
        return Err(LabError::degenerate("signal contains non-finite samples"));
    }

    let mut work = odd_extend(signal, pad);
    cascade(sections, &mut work);
    work.reverse();
    cascade(sections, &mut work);
    work.reverse();

    Ok(work[pad..pad + signal.len()].to_vec())
}

/// Designs and applies a zero-phase Butterworth low-pass in one step.
pub fn lowpass(signal: &[f64], cutoff_hz: f64, order: usize, sample_rate: f64) -> Result<Vec<f64>> {
    let sections = butterworth_lowpass(order, cutoff_hz, sample_rate)?;
    filtfilt(&sections, signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_has_unit_dc_gain() {
        for order in 1..=8 {
            let sections = butterworth_lowpass(order, 2.0, 80.0).unwrap();
            assert_eq!(sections.len(), order.div_ceil(2));
            let gain: f64 = sections.iter().map(Biquad::dc_gain).product();
            assert!((gain - 1.0).abs() < 1e-9, "order {} gain {}", order, gain);
        }
    }

    #[test]
    fn test_half_power_at_cutoff() {
        // |H|^2 at the cutoff is 1/2 for every Butterworth order.
        let fs = 100.0;
        let fc = 10.0;
        let sections = butterworth_lowpass(4, fc, fs).unwrap();
        let w = 2.0 * PI * fc / fs;
        let mut power = 1.0;
        for s in &sections {
            let eval = |c: &[f64; 3]| {
                let re = c[0] + c[1] * w.cos() + c[2] * (2.0 * w).cos();
                let im = -c[1] * w.sin() - c[2] * (2.0 * w).sin();
                re * re + im * im
            };
            power *= eval(&s.b) / eval(&s.a);
        }
        assert!((power - 0.5).abs() < 1e-9, "power {}", power);
    }

    #[test]
    fn test_constant_signal_passes_unchanged() {
        let signal = vec![0.75; 200];
        let out = lowpass(&signal, 2.0, 4, 80.0).unwrap();
        assert_eq!(out.len(), signal.len());
        assert!(out.iter().all(|v| (v - 0.75).abs() < 1e-9));
    }

    #[test]
    fn test_output_length_matches_input() {
        for len in [16, 17, 100, 501] {
            let signal: Vec<f64> = (0..len).map(|i| (i as f64 * 0.3).sin()).collect();
            assert_eq!(lowpass(&signal, 2.0, 4, 80.0).unwrap().len(), len);
        }
    }

    #[test]
    fn test_short_signal_is_degenerate() {
        let err = lowpass(&[1.0; 15], 2.0, 4, 80.0).unwrap_err();
        assert!(err.is_degenerate());
        assert!(lowpass(&[], 2.0, 4, 80.0).is_err());
    }

    #[test]
    fn test_invalid_design_is_degenerate() {
        assert!(butterworth_lowpass(0, 2.0, 80.0).unwrap_err().is_degenerate());
        assert!(butterworth_lowpass(4, 40.0, 80.0).is_err());
        assert!(butterworth_lowpass(4, 0.0, 80.0).is_err());
        assert!(butterworth_lowpass(4, 2.0, f64::NAN).is_err());
    }

    #[test]
    fn test_odd_extension_reflects_about_endpoints() {
        let ext = odd_extend(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }
}

//! # Signal Module
//!
//! The sine-plus-noise model behind both signal-filtering demos and the
//! derivation that turns a parameter snapshot into a [`SignalFrame`].
//!
//! Every cycle produces:
//! 1. the clean harmonic `A * sin(2π f t + φ)` over a fixed time axis
//! 2. the noisy signal, with Gaussian noise added when enabled
//! 3. the zero-phase low-pass filtered noisy signal, when it is displayed

use crate::error::{LabError, Result};
use crate::filter;
use crate::params::{ControlSpec, ParameterStore};
use crate::session::Derivation;
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use serde::Serialize;
use statrs::distribution::Normal;
use std::cell::RefCell;
use std::f64::consts::PI;

/// Default number of samples on the time axis.
pub const DEFAULT_SAMPLES: usize = 500;

/// Control identifiers of the signal demos.
pub mod controls {
    pub const AMPLITUDE: &str = "amplitude";
    pub const FREQUENCY: &str = "frequency";
    pub const PHASE: &str = "phase";
    pub const NOISE_MEAN: &str = "noise_mean";
    pub const NOISE_VARIANCE: &str = "noise_variance";
    pub const CUTOFF: &str = "cutoff_frequency";
    pub const FILTER_ORDER: &str = "filter_order";
    pub const NOISE_ENABLED: &str = "noise_enabled";
    pub const FILTER_ENABLED: &str = "filter_enabled";
}

/// Declared controls of the signal demos, with their domains and defaults.
pub static SIGNAL_CONTROLS: Lazy<Vec<ControlSpec>> = Lazy::new(|| {
    use controls::*;
    vec![
        ControlSpec::float(AMPLITUDE, "A (amplitude)", 0.1, 5.0, 1.0),
        ControlSpec::float(FREQUENCY, "f (Hz)", 0.1, 5.0, 1.0),
        ControlSpec::float(PHASE, "Phase (rad)", 0.0, 2.0 * PI, 0.0),
        ControlSpec::float(NOISE_MEAN, "Noise: mean", -1.0, 1.0, 0.0),
        ControlSpec::float(NOISE_VARIANCE, "Noise: variance", 0.0, 1.0, 0.0),
        ControlSpec::float(CUTOFF, "Filter: cutoff f (Hz)", 0.1, 5.0, 2.0),
        ControlSpec::int(FILTER_ORDER, "Filter: order", 1, 8, 4),
        ControlSpec::toggle(NOISE_ENABLED, "Noise", false),
        ControlSpec::toggle(FILTER_ENABLED, "Filter", false),
    ]
});

/// A fresh parameter store for a signal demo.
pub fn signal_store() -> Result<ParameterStore> {
    ParameterStore::new(SIGNAL_CONTROLS.clone())
}

/// Evenly spaced sample times over `[0, 2π]`, both ends included.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    t: Vec<f64>,
    sample_rate: f64,
}

impl TimeAxis {
    pub fn new(samples: usize) -> Result<Self> {
        if samples < 2 {
            return Err(LabError::degenerate(format!(
                "time axis needs at least 2 samples, got {}",
                samples
            )));
        }
        let step = 2.0 * PI / (samples - 1) as f64;
        let mut t: Vec<f64> = (0..samples).map(|i| i as f64 * step).collect();
        t[samples - 1] = 2.0 * PI;
        Ok(Self { t, sample_rate: 1.0 / step })
    }

    pub fn times(&self) -> &[f64] {
        &self.t
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Samples per unit of time.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

/// A snapshot of the signal controls.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub noise_mean: f64,
    pub noise_variance: f64,
    pub noise_enabled: bool,
    pub cutoff_frequency: f64,
    pub filter_order: usize,
    pub filter_enabled: bool,
}

impl SignalParams {
    pub fn from_store(store: &ParameterStore) -> Result<Self> {
        use controls::*;
        Ok(Self {
            amplitude: store.float(AMPLITUDE)?,
            frequency: store.float(FREQUENCY)?,
            phase: store.float(PHASE)?,
            noise_mean: store.float(NOISE_MEAN)?,
            noise_variance: store.float(NOISE_VARIANCE)?,
            noise_enabled: store.toggle(NOISE_ENABLED)?,
            cutoff_frequency: store.float(CUTOFF)?,
            filter_order: store.int(FILTER_ORDER)? as usize,
            filter_enabled: store.toggle(FILTER_ENABLED)?,
        })
    }
}

/// When the filtered signal is part of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDisplay {
    /// Filtered output appears only while the filter toggle is on.
    HideWhenDisabled,
    /// Filtered output always appears; the toggle has no effect.
    AlwaysShow,
}

/// One derived frame of the signal demo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalFrame {
    pub t: Vec<f64>,
    pub clean: Vec<f64>,
    pub noisy: Vec<f64>,
    /// `None` when the filtered signal is hidden.
    pub filtered: Option<Vec<f64>>,
}

/// Computes `A * sin(2π f t + φ)` for every sample time.
pub fn harmonic(t: &[f64], amplitude: f64, frequency: f64, phase: f64) -> Vec<f64> {
    t.iter()
        .map(|&ti| amplitude * (2.0 * PI * frequency * ti + phase).sin())
        .collect()
}

/// Adds Gaussian noise with the given mean and variance to `signal`.
/// Zero variance adds the constant `mean`.
pub fn add_noise<R: rand::Rng>(signal: &[f64], mean: f64, variance: f64, rng: &mut R) -> Result<Vec<f64>> {
    if variance == 0.0 {
        return Ok(signal.iter().map(|s| s + mean).collect());
    }
    let normal = Normal::new(mean, variance.sqrt())
        .map_err(|e| LabError::degenerate(format!("noise distribution: {}", e)))?;
    Ok(signal.iter().map(|s| s + normal.sample(rng)).collect())
}

/// Filter-variant derivation: parameters to clean, noisy and filtered signals.
#[derive(Debug)]
pub struct SignalDerivation {
    axis: TimeAxis,
    display: FilterDisplay,
    rng: RefCell<StdRng>,
}

impl SignalDerivation {
    /// Derivation drawing noise from an entropy-seeded generator.
    pub fn new(axis: TimeAxis, display: FilterDisplay) -> Self {
        Self { axis, display, rng: RefCell::new(StdRng::from_entropy()) }
    }

    /// Derivation with reproducible noise.
    pub fn with_seed(axis: TimeAxis, display: FilterDisplay, seed: u64) -> Self {
        Self { axis, display, rng: RefCell::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn display(&self) -> FilterDisplay {
        self.display
    }

    pub fn compute(&self, params: &SignalParams) -> Result<SignalFrame> {
        let t = self.axis.times();
        let clean = harmonic(t, params.amplitude, params.frequency, params.phase);

        let noisy = if params.noise_enabled {
            let mut rng = self.rng.borrow_mut();
            add_noise(&clean, params.noise_mean, params.noise_variance, &mut *rng)?
        } else {
            clean.clone()
        };

        let show_filtered = match self.display {
            FilterDisplay::AlwaysShow => true,
            FilterDisplay::HideWhenDisabled => params.filter_enabled,
        };
        let filtered = if show_filtered {
            Some(filter::lowpass(
                &noisy,
                params.cutoff_frequency,
                params.filter_order,
                self.axis.sample_rate(),
            )?)
        } else {
            None
        };

        Ok(SignalFrame { t: t.to_vec(), clean, noisy, filtered })
    }
}

impl Derivation for SignalDerivation {
    type Output = SignalFrame;

    fn derive(&self, store: &ParameterStore) -> Result<SignalFrame> {
        self.compute(&SignalParams::from_store(store)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Value;

    fn derivation(display: FilterDisplay) -> SignalDerivation {
        SignalDerivation::with_seed(TimeAxis::new(DEFAULT_SAMPLES).unwrap(), display, 7)
    }

    #[test]
    fn test_time_axis_spans_two_pi() {
        let axis = TimeAxis::new(500).unwrap();
        assert_eq!(axis.len(), 500);
        assert_eq!(axis.times()[0], 0.0);
        assert!((axis.times()[499] - 2.0 * PI).abs() < 1e-12);
        assert!((axis.sample_rate() - 499.0 / (2.0 * PI)).abs() < 1e-9);
        assert!(TimeAxis::new(1).unwrap_err().is_degenerate());
    }

    #[test]
    fn test_defaults_produce_unit_sine() {
        let store = signal_store().unwrap();
        let frame = derivation(FilterDisplay::HideWhenDisabled).derive(&store).unwrap();
        assert_eq!(frame.clean, frame.noisy);
        assert!(frame.filtered.is_none());
        let peak = frame.clean.iter().cloned().fold(f64::MIN, f64::max);
        assert!((peak - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_filter_toggle_controls_visibility() {
        let mut store = signal_store().unwrap();
        let hidden = derivation(FilterDisplay::HideWhenDisabled);
        let always = derivation(FilterDisplay::AlwaysShow);
        assert!(always.derive(&store).unwrap().filtered.is_some());

        store.set(controls::FILTER_ENABLED, Value::Toggle(true)).unwrap();
        let frame = hidden.derive(&store).unwrap();
        assert_eq!(frame.filtered.map(|f| f.len()), Some(DEFAULT_SAMPLES));
    }

    #[test]
    fn test_hidden_filter_is_not_run() {
        // Four samples are too few to filter at any cutoff.
        let store = signal_store().unwrap();
        let short = |display| SignalDerivation::with_seed(TimeAxis::new(4).unwrap(), display, 1);
        assert!(short(FilterDisplay::AlwaysShow).derive(&store).unwrap_err().is_degenerate());
        let frame = short(FilterDisplay::HideWhenDisabled).derive(&store).unwrap();
        assert!(frame.filtered.is_none());
    }

    #[test]
    fn test_zero_variance_noise_is_a_constant_offset() {
        let mut store = signal_store().unwrap();
        store.set(controls::NOISE_ENABLED, Value::Toggle(true)).unwrap();
        store.set(controls::NOISE_MEAN, Value::Float(0.5)).unwrap();
        let frame = derivation(FilterDisplay::HideWhenDisabled).derive(&store).unwrap();
        for (c, n) in frame.clean.iter().zip(&frame.noisy) {
            assert!((n - c - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_statistics_follow_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        let base = vec![0.0; 20_000];
        let noisy = add_noise(&base, -0.3, 0.25, &mut rng).unwrap();
        let n = noisy.len() as f64;
        let mean = noisy.iter().sum::<f64>() / n;
        let var = noisy.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!((mean + 0.3).abs() < 0.02, "mean {}", mean);
        assert!((var - 0.25).abs() < 0.02, "variance {}", var);
    }
}

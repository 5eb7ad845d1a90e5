//! # Session Module
//!
//! The mutate → recompute → render cycle shared by every interactive lab.
//!
//! A [`Session`] owns a [`ParameterStore`] and a [`Derivation`]. Every user
//! action arrives as a [`ControlEvent`] and goes through the single
//! [`Session::apply`] routine: the store is updated, the derivation is run on
//! the new snapshot, and the complete result replaces whatever the
//! [`RenderSink`] showed before. Nothing is cached between cycles.

use crate::error::{LabError, Result};
use crate::params::{ParameterStore, Value};
use log::{debug, warn};

/// A pure function from a parameter snapshot to a derived dataset.
pub trait Derivation {
    type Output;

    fn derive(&self, store: &ParameterStore) -> Result<Self::Output>;
}

/// Receives derived frames. Each call replaces the previous content.
pub trait RenderSink<T> {
    fn render(&mut self, frame: &Result<T>);
}

/// A user action on one of the controls.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Set { name: String, value: Value },
    Reset,
}

impl ControlEvent {
    pub fn set(name: impl Into<String>, value: Value) -> Self {
        ControlEvent::Set { name: name.into(), value }
    }
}

/// Render sink that keeps only the most recent frame.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    frame: Option<Result<T>>,
    renders: usize,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { frame: None, renders: 0 }
    }
}

impl<T> Snapshot<T> {
    pub fn frame(&self) -> Option<&Result<T>> {
        self.frame.as_ref()
    }

    /// The latest frame if it was derived successfully.
    pub fn current(&self) -> Option<&T> {
        self.frame.as_ref().and_then(|f| f.as_ref().ok())
    }

    /// The latest failure, if the last derivation failed.
    pub fn failure(&self) -> Option<&LabError> {
        self.frame.as_ref().and_then(|f| f.as_ref().err())
    }

    /// Number of frames rendered so far.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl<T: Clone> RenderSink<T> for Snapshot<T> {
    fn render(&mut self, frame: &Result<T>) {
        self.frame = Some(frame.clone());
        self.renders += 1;
    }
}

/// One lab session: parameter store plus the derivation it drives.
#[derive(Debug)]
pub struct Session<D> {
    derivation: D,
    store: ParameterStore,
}

impl<D: Derivation> Session<D> {
    pub fn new(derivation: D, store: ParameterStore) -> Self {
        Self { derivation, store }
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn derivation(&self) -> &D {
        &self.derivation
    }

    /// Derives from the current state and renders, without mutating.
    pub fn refresh<S: RenderSink<D::Output>>(&self, sink: &mut S) {
        let frame = self.derivation.derive(&self.store);
        if let Err(e) = &frame {
            warn!("derivation failed: {}", e);
        }
        sink.render(&frame);
    }

    /// Applies one control event and runs exactly one render cycle.
    ///
    /// A rejected update is returned as the error; the store keeps its
    /// previous value and the sink is left untouched.
    pub fn apply<S: RenderSink<D::Output>>(&mut self, event: ControlEvent, sink: &mut S) -> Result<()> {
        match event {
            ControlEvent::Set { name, value } => match self.store.set(&name, value) {
                Ok(stored) => debug!("{} -> {}", name, stored),
                Err(e) => {
                    warn!("rejected update: {}", e);
                    return Err(e);
                }
            },
            ControlEvent::Reset => {
                debug!("resetting all controls to defaults");
                self.store.reset();
            }
        }
        self.refresh(sink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ControlSpec;

    /// Doubles `x`; undefined when `x` is zero.
    struct Double;

    impl Derivation for Double {
        type Output = f64;

        fn derive(&self, store: &ParameterStore) -> Result<f64> {
            let x = store.float("x")?;
            if x == 0.0 {
                return Err(LabError::degenerate("x is zero"));
            }
            Ok(2.0 * x)
        }
    }

    fn session() -> Session<Double> {
        let store = ParameterStore::new(vec![ControlSpec::float("x", "X", -1.0, 1.0, 0.5)]).unwrap();
        Session::new(Double, store)
    }

    #[test]
    fn test_apply_runs_one_cycle() {
        let mut s = session();
        let mut sink = Snapshot::default();
        s.apply(ControlEvent::set("x", Value::Float(0.25)), &mut sink).unwrap();
        assert_eq!(sink.current(), Some(&0.5));
        assert_eq!(sink.renders(), 1);
    }

    #[test]
    fn test_rejected_update_does_not_render() {
        let mut s = session();
        let mut sink = Snapshot::default();
        s.refresh(&mut sink);
        let err = s.apply(ControlEvent::set("x", Value::Toggle(true)), &mut sink);
        assert!(err.is_err());
        assert_eq!(sink.renders(), 1);
        assert_eq!(sink.current(), Some(&1.0));
    }

    #[test]
    fn test_degenerate_result_is_rendered_as_failure() {
        let mut s = session();
        let mut sink = Snapshot::default();
        s.apply(ControlEvent::set("x", Value::Float(0.0)), &mut sink).unwrap();
        assert!(sink.current().is_none());
        assert!(sink.failure().is_some_and(LabError::is_degenerate));
    }

    #[test]
    fn test_reset_matches_fresh_session() {
        let mut used = session();
        let mut sink = Snapshot::default();
        used.apply(ControlEvent::set("x", Value::Float(-0.9)), &mut sink).unwrap();
        used.apply(ControlEvent::Reset, &mut sink).unwrap();

        let fresh = session();
        let mut fresh_sink = Snapshot::default();
        fresh.refresh(&mut fresh_sink);
        assert_eq!(sink.current(), fresh_sink.current());
    }
}

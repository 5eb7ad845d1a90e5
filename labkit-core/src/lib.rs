// labkit-core/src/lib.rs

//! The core logic for the lab exercises.
//! This crate holds the parameter store, the mutate-recompute-render session
//! cycle, the signal/dashboard/regression derivations and the source loaders.
//! It is completely headless and contains no GUI or HTTP code.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod params;
pub mod regression;
pub mod session;
pub mod signal;
pub mod vegetation;

pub use error::{LabError, Result};
pub use params::{ControlSpec, Domain, ParameterStore, Value};
pub use session::{ControlEvent, Derivation, RenderSink, Session, Snapshot};

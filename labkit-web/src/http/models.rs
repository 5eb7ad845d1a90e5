//! Request and response bodies

use labkit_core::Value;
use labkit_core::signal::SignalFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Submitted by every control form.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlForm {
    pub name: String,
    pub value: String,
}

/// Current parameter values together with the latest frame.
#[derive(Debug, Serialize)]
pub struct FrameResponse<'a> {
    pub params: BTreeMap<&'static str, Value>,
    pub frame: Option<&'a SignalFrame>,
    /// Set when the latest derivation was undefined.
    pub error: Option<String>,
    pub renders: usize,
}

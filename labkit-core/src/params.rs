//! # Parameter Store Module
//!
//! Holds the current value of every user-adjustable control of a lab session.
//! Each control declares a domain and a default; updates are validated
//! against the domain before they are stored.
//!
//! ## Update policy
//! - Numeric values (floats, integers, integer ranges) are clamped into
//!   their domain. Range ends are clamped independently and then ordered,
//!   so a stored range always satisfies `low <= high`.
//! - Values that have no nearest valid neighbour are rejected with
//!   [`LabError::InvalidParameter`] and the previous value is kept: unknown
//!   control names, a value of the wrong kind, a choice outside its
//!   enumerated set, and NaN.

use crate::error::{LabError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single control value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Float(f64),
    Int(i64),
    IntRange(i64, i64),
    Choice(String),
    Toggle(bool),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Int(_) => "integer",
            Value::IntRange(..) => "integer range",
            Value::Choice(_) => "choice",
            Value::Toggle(_) => "toggle",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{:.2}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::IntRange(lo, hi) => write!(f, "{}..={}", lo, hi),
            Value::Choice(c) => f.write_str(c),
            Value::Toggle(b) => write!(f, "{}", if *b { "on" } else { "off" }),
        }
    }
}

/// The set of values a control accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Float { min: f64, max: f64 },
    Int { min: i64, max: i64 },
    IntRange { min: i64, max: i64 },
    Choice(Vec<String>),
    Toggle,
}

impl Domain {
    /// Validates `value` for the control `name`, returning the value that
    /// should actually be stored.
    pub fn admit(&self, name: &str, value: Value) -> Result<Value> {
        match (self, value) {
            (Domain::Float { min, max }, Value::Float(v)) => {
                if v.is_nan() {
                    return Err(LabError::invalid(name, "value is NaN"));
                }
                Ok(Value::Float(v.clamp(*min, *max)))
            }
            (Domain::Int { min, max }, Value::Int(v)) => Ok(Value::Int(v.clamp(*min, *max))),
            (Domain::IntRange { min, max }, Value::IntRange(lo, hi)) => {
                let lo = lo.clamp(*min, *max);
                let hi = hi.clamp(*min, *max);
                Ok(Value::IntRange(lo.min(hi), lo.max(hi)))
            }
            (Domain::Choice(options), Value::Choice(choice)) => {
                if options.iter().any(|o| *o == choice) {
                    Ok(Value::Choice(choice))
                } else {
                    Err(LabError::invalid(
                        name,
                        format!("'{}' is not one of [{}]", choice, options.join(", ")),
                    ))
                }
            }
            (Domain::Toggle, Value::Toggle(b)) => Ok(Value::Toggle(b)),
            (domain, value) => Err(LabError::invalid(
                name,
                format!("expected {}, got {}", domain.kind(), value.kind()),
            )),
        }
    }

    /// Parses a textual value (e.g. from an HTML form) into a value of this
    /// domain's kind. Parsing does not clamp; pass the result to `admit`.
    pub fn parse(&self, name: &str, raw: &str) -> Result<Value> {
        let raw = raw.trim();
        let bad = |what: &str| LabError::invalid(name, format!("cannot parse '{}' as {}", raw, what));
        match self {
            Domain::Float { .. } => raw.parse::<f64>().map(Value::Float).map_err(|_| bad("float")),
            Domain::Int { .. } => raw.parse::<i64>().map(Value::Int).map_err(|_| bad("integer")),
            Domain::IntRange { .. } => {
                let (lo, hi) = raw
                    .split_once("..=")
                    .or_else(|| raw.split_once(','))
                    .ok_or_else(|| bad("integer range"))?;
                let lo = lo.trim().parse::<i64>().map_err(|_| bad("integer range"))?;
                let hi = hi.trim().parse::<i64>().map_err(|_| bad("integer range"))?;
                Ok(Value::IntRange(lo, hi))
            }
            Domain::Choice(_) => Ok(Value::Choice(raw.to_string())),
            Domain::Toggle => match raw {
                "true" | "on" | "1" => Ok(Value::Toggle(true)),
                "false" | "off" | "0" => Ok(Value::Toggle(false)),
                _ => Err(bad("toggle")),
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Domain::Float { .. } => "float",
            Domain::Int { .. } => "integer",
            Domain::IntRange { .. } => "integer range",
            Domain::Choice(_) => "choice",
            Domain::Toggle => "toggle",
        }
    }

    fn is_well_formed(&self) -> bool {
        match self {
            Domain::Float { min, max } => min.is_finite() && max.is_finite() && min <= max,
            Domain::Int { min, max } | Domain::IntRange { min, max } => min <= max,
            Domain::Choice(options) => !options.is_empty(),
            Domain::Toggle => true,
        }
    }
}

/// Declaration of a control: identifier, display label, domain and default.
#[derive(Debug, Clone)]
pub struct ControlSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub domain: Domain,
    pub default: Value,
}

impl ControlSpec {
    pub fn float(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self { name, label, domain: Domain::Float { min, max }, default: Value::Float(default) }
    }

    pub fn int(name: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self { name, label, domain: Domain::Int { min, max }, default: Value::Int(default) }
    }

    /// A range control whose default spans the whole domain.
    pub fn range(name: &'static str, label: &'static str, min: i64, max: i64) -> Self {
        Self { name, label, domain: Domain::IntRange { min, max }, default: Value::IntRange(min, max) }
    }

    /// A choice control whose default is the first option.
    pub fn choice(name: &'static str, label: &'static str, options: Vec<String>) -> Self {
        let default = Value::Choice(options.first().cloned().unwrap_or_default());
        Self { name, label, domain: Domain::Choice(options), default }
    }

    pub fn toggle(name: &'static str, label: &'static str, default: bool) -> Self {
        Self { name, label, domain: Domain::Toggle, default: Value::Toggle(default) }
    }
}

#[derive(Debug, Clone)]
struct Control {
    spec: ControlSpec,
    value: Value,
}

/// Current values of a session's controls, in declaration order.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    controls: Vec<Control>,
}

impl ParameterStore {
    /// Creates a store with every control at its default.
    pub fn new(specs: Vec<ControlSpec>) -> Result<Self> {
        let mut controls: Vec<Control> = Vec::with_capacity(specs.len());
        for spec in specs {
            if controls.iter().any(|c| c.spec.name == spec.name) {
                return Err(LabError::invalid(spec.name, "declared twice"));
            }
            if !spec.domain.is_well_formed() {
                return Err(LabError::invalid(spec.name, "empty or inverted domain"));
            }
            // A default must be stored as-is, not clamped into place.
            let admitted = spec.domain.admit(spec.name, spec.default.clone())?;
            if admitted != spec.default {
                return Err(LabError::invalid(spec.name, "default lies outside its domain"));
            }
            controls.push(Control { value: admitted, spec });
        }
        Ok(Self { controls })
    }

    fn control(&self, name: &str) -> Result<&Control> {
        self.controls
            .iter()
            .find(|c| c.spec.name == name)
            .ok_or_else(|| LabError::invalid(name, "no such control"))
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.control(name).map(|c| &c.value)
    }

    pub fn spec(&self, name: &str) -> Result<&ControlSpec> {
        self.control(name).map(|c| &c.spec)
    }

    /// Validates and stores `value`, returning what was stored.
    /// On error the previous value is retained.
    pub fn set(&mut self, name: &str, value: Value) -> Result<Value> {
        let control = self
            .controls
            .iter_mut()
            .find(|c| c.spec.name == name)
            .ok_or_else(|| LabError::invalid(name, "no such control"))?;
        let admitted = control.spec.domain.admit(name, value)?;
        control.value = admitted.clone();
        Ok(admitted)
    }

    /// Restores every control to its default.
    pub fn reset(&mut self) {
        for control in &mut self.controls {
            control.value = control.spec.default.clone();
        }
    }

    /// Controls with their current values, in declaration order.
    pub fn controls(&self) -> impl Iterator<Item = (&ControlSpec, &Value)> {
        self.controls.iter().map(|c| (&c.spec, &c.value))
    }

    /// Name/value map of the current state.
    pub fn snapshot(&self) -> BTreeMap<&'static str, Value> {
        self.controls.iter().map(|c| (c.spec.name, c.value.clone())).collect()
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        match self.get(name)? {
            Value::Float(v) => Ok(*v),
            other => Err(LabError::invalid(name, format!("holds a {}, not a float", other.kind()))),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name)? {
            Value::Int(v) => Ok(*v),
            other => Err(LabError::invalid(name, format!("holds a {}, not an integer", other.kind()))),
        }
    }

    pub fn range(&self, name: &str) -> Result<(i64, i64)> {
        match self.get(name)? {
            Value::IntRange(lo, hi) => Ok((*lo, *hi)),
            other => Err(LabError::invalid(name, format!("holds a {}, not a range", other.kind()))),
        }
    }

    pub fn choice(&self, name: &str) -> Result<&str> {
        match self.get(name)? {
            Value::Choice(c) => Ok(c.as_str()),
            other => Err(LabError::invalid(name, format!("holds a {}, not a choice", other.kind()))),
        }
    }

    pub fn toggle(&self, name: &str) -> Result<bool> {
        match self.get(name)? {
            Value::Toggle(b) => Ok(*b),
            other => Err(LabError::invalid(name, format!("holds a {}, not a toggle", other.kind()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::new(vec![
            ControlSpec::float("amplitude", "A", 0.1, 5.0, 1.0),
            ControlSpec::int("order", "Order", 1, 8, 4),
            ControlSpec::range("weeks", "Weeks", 1, 52),
            ControlSpec::choice("index", "Index", vec!["VCI".into(), "TCI".into(), "VHI".into()]),
            ControlSpec::toggle("noise", "Noise", false),
        ])
        .unwrap()
    }

    #[test]
    fn test_defaults_are_initial_values() {
        let s = store();
        assert_eq!(s.float("amplitude").unwrap(), 1.0);
        assert_eq!(s.int("order").unwrap(), 4);
        assert_eq!(s.range("weeks").unwrap(), (1, 52));
        assert_eq!(s.choice("index").unwrap(), "VCI");
        assert!(!s.toggle("noise").unwrap());
    }

    #[test]
    fn test_numeric_values_clamp() {
        let mut s = store();
        assert_eq!(s.set("amplitude", Value::Float(9.0)).unwrap(), Value::Float(5.0));
        assert_eq!(s.set("amplitude", Value::Float(-1.0)).unwrap(), Value::Float(0.1));
        assert_eq!(s.set("order", Value::Int(0)).unwrap(), Value::Int(1));
        assert_eq!(s.float("amplitude").unwrap(), 0.1);
    }

    #[test]
    fn test_range_is_clamped_and_ordered() {
        let mut s = store();
        let stored = s.set("weeks", Value::IntRange(60, 10)).unwrap();
        assert_eq!(stored, Value::IntRange(10, 52));
        let (lo, hi) = s.range("weeks").unwrap();
        assert!(lo <= hi);
    }

    #[test]
    fn test_rejected_update_keeps_previous_value() {
        let mut s = store();
        s.set("index", Value::Choice("TCI".into())).unwrap();
        let err = s.set("index", Value::Choice("NDVI".into())).unwrap_err();
        assert!(matches!(err, LabError::InvalidParameter { .. }));
        assert_eq!(s.choice("index").unwrap(), "TCI");

        assert!(s.set("amplitude", Value::Float(f64::NAN)).is_err());
        assert_eq!(s.float("amplitude").unwrap(), 1.0);

        assert!(s.set("noise", Value::Float(1.0)).is_err());
        assert!(s.set("missing", Value::Toggle(true)).is_err());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut s = store();
        let fresh = s.snapshot();
        s.set("amplitude", Value::Float(3.0)).unwrap();
        s.set("weeks", Value::IntRange(5, 6)).unwrap();
        s.set("noise", Value::Toggle(true)).unwrap();
        assert_ne!(s.snapshot(), fresh);
        s.reset();
        assert_eq!(s.snapshot(), fresh);
    }

    #[test]
    fn test_bad_declarations_are_refused() {
        let dup = ParameterStore::new(vec![
            ControlSpec::toggle("x", "X", false),
            ControlSpec::toggle("x", "X", true),
        ]);
        assert!(dup.is_err());

        let outside = ParameterStore::new(vec![ControlSpec::float("f", "F", 0.0, 1.0, 2.0)]);
        assert!(outside.is_err());

        let empty = ParameterStore::new(vec![ControlSpec::choice("c", "C", vec![])]);
        assert!(empty.is_err());
    }

    #[test]
    fn test_parse_textual_values() {
        let s = store();
        let weeks = &s.spec("weeks").unwrap().domain;
        assert_eq!(weeks.parse("weeks", "3,9").unwrap(), Value::IntRange(3, 9));
        assert_eq!(weeks.parse("weeks", "3..=9").unwrap(), Value::IntRange(3, 9));
        let noise = &s.spec("noise").unwrap().domain;
        assert_eq!(noise.parse("noise", "on").unwrap(), Value::Toggle(true));
        let amp = &s.spec("amplitude").unwrap().domain;
        assert!(amp.parse("amplitude", "loud").is_err());
    }
}

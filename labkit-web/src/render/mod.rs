//! # Page Rendering
//!
//! Builds the demo page from the parameter store and the latest frame:
//! one form per control, a reset form, and two inline SVG charts.

pub mod svg;

use labkit_core::signal::SignalFrame;
use labkit_core::{ControlSpec, Domain, LabError, ParameterStore, Result, Value};
use svg::Line;

const STYLE: &str = "body{font-family:sans-serif;background:#1e1f22;color:#ddd;margin:20px}\
main{display:flex;gap:20px}aside{width:280px}form{margin:0 0 14px}\
label{display:block;font-size:14px;margin-bottom:4px}input[type=range]{width:100%}\
svg text{fill:#ddd;font-size:11px}svg .title{font-size:15px}svg .axis{stroke:#888}";

const CLEAN_COLOR: &str = "#d9d9d9";
const NOISY_COLOR: &str = "#3498db";
const FILTERED_COLOR: &str = "#2ecc71";

/// Escapes text for HTML bodies and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Message shown in place of a chart whose frame could not be derived.
fn undefined(error: &LabError) -> String {
    if error.is_degenerate() { error.to_string() } else { format!("undefined: {}", error) }
}

/// The full HTML page.
pub fn page(store: &ParameterStore, frame: Option<&Result<SignalFrame>>) -> String {
    let forms: String = store.controls().map(|(spec, value)| control_form(spec, value)).collect();
    let (left, right) = charts(frame);
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Harmonic with noise and filter</title>\
         <style>{STYLE}</style></head><body><h1>Harmonic signal lab</h1><main>\
         <aside>{forms}<form method=\"post\" action=\"/reset\"><button type=\"submit\">Reset</button></form></aside>\
         <section>{left}{right}</section></main></body></html>"
    )
}

fn charts(frame: Option<&Result<SignalFrame>>) -> (String, String) {
    const SIGNAL: &str = "Harmonic with noise";
    const FILTERED: &str = "Filtered signal";
    match frame {
        Some(Ok(f)) => {
            let signal = svg::line_chart(
                SIGNAL,
                &[
                    Line { name: "noisy", xs: &f.t, ys: &f.noisy, color: NOISY_COLOR, dashed: false },
                    Line { name: "clean", xs: &f.t, ys: &f.clean, color: CLEAN_COLOR, dashed: true },
                ],
            );
            let filtered = match &f.filtered {
                Some(ys) => svg::line_chart(
                    FILTERED,
                    &[Line { name: "filtered", xs: &f.t, ys, color: FILTERED_COLOR, dashed: false }],
                ),
                None => svg::placeholder(&format!("{} (disabled)", FILTERED), ""),
            };
            (signal, filtered)
        }
        Some(Err(e)) => {
            let message = undefined(e);
            (svg::placeholder(SIGNAL, &message), svg::placeholder(FILTERED, &message))
        }
        None => (svg::placeholder(SIGNAL, "no frame yet"), svg::placeholder(FILTERED, "")),
    }
}

/// One self-submitting form for a control.
fn control_form(spec: &ControlSpec, value: &Value) -> String {
    let input = match (&spec.domain, value) {
        (Domain::Float { min, max }, Value::Float(v)) => format!(
            "<label>{} = {:.2}</label><input type=\"range\" name=\"value\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{}\" onchange=\"this.form.submit()\">",
            escape(spec.label),
            v,
            min,
            max,
            (max - min) / 200.0,
            v
        ),
        (Domain::Int { min, max }, Value::Int(v)) => format!(
            "<label>{} = {}</label><input type=\"range\" name=\"value\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\" onchange=\"this.form.submit()\">",
            escape(spec.label),
            v,
            min,
            max,
            v
        ),
        (Domain::IntRange { min, max }, Value::IntRange(lo, hi)) => format!(
            "<label>{} ({} to {})</label><input type=\"text\" name=\"value\" value=\"{},{}\"><button type=\"submit\">Set</button>",
            escape(spec.label),
            min,
            max,
            lo,
            hi
        ),
        (Domain::Choice(options), Value::Choice(current)) => {
            let options: String = options
                .iter()
                .map(|o| {
                    let selected = if o == current { " selected" } else { "" };
                    format!("<option value=\"{0}\"{1}>{0}</option>", escape(o), selected)
                })
                .collect();
            format!(
                "<label>{}</label><select name=\"value\" onchange=\"this.form.submit()\">{}</select>",
                escape(spec.label),
                options
            )
        }
        (Domain::Toggle, Value::Toggle(on)) => format!(
            "<input type=\"hidden\" name=\"value\" value=\"{}\"><button type=\"submit\">{}: {}</button>",
            !on,
            escape(spec.label),
            if *on { "on" } else { "off" }
        ),
        _ => format!("<label>{}: {}</label>", escape(spec.label), escape(&value.to_string())),
    };
    format!(
        "<form method=\"post\" action=\"/control\"><input type=\"hidden\" name=\"name\" value=\"{}\">{}</form>",
        escape(spec.name),
        input
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use labkit_core::signal::signal_store;

    #[test]
    fn test_every_control_gets_a_form() {
        let store = signal_store().unwrap();
        let html = page(&store, None);
        assert_eq!(html.matches("action=\"/control\"").count(), store.controls().count());
        assert!(html.contains("value=\"cutoff_frequency\""));
    }

    #[test]
    fn test_toggle_form_submits_the_opposite_state() {
        let spec = ControlSpec::toggle("noise_enabled", "Noise", false);
        let form = control_form(&spec, &Value::Toggle(false));
        assert!(form.contains("name=\"value\" value=\"true\""));
        assert!(form.contains("Noise: off"));
    }

    #[test]
    fn test_failed_frame_renders_undefined() {
        let store = signal_store().unwrap();
        let failed: Result<SignalFrame> = Err(LabError::degenerate("signal too short"));
        let html = page(&store, Some(&failed));
        assert_eq!(html.matches("undefined result: signal too short").count(), 2);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}

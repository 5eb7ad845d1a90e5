//! # UI Module
//!
//! Views of the lab windows and the control widgets they share.

pub mod dashboard;
pub mod regression;
pub mod signal;

use crate::Message;
use iced::widget::{Space, button, checkbox, column, container, horizontal_space, pick_list, row, slider, text};
use iced::{Color, Element, Length};
use labkit_core::{ControlSpec, Domain, LabError, Value};

const NOTICE_COLOR: Color = Color::from_rgb(0.95, 0.55, 0.25);
/// Float sliders move in this many steps across their domain.
const FLOAT_STEPS: f64 = 200.0;

/// Builds the widget for one declared control.
///
/// Every callback emits [`Message::Control`] with the control's name, so
/// all controls share a single update path.
pub fn control<'a>(spec: &'a ControlSpec, value: &'a Value) -> Element<'a, Message> {
    let name = spec.name;
    match (&spec.domain, value) {
        (Domain::Float { min, max }, Value::Float(v)) => labelled(
            spec.label,
            format!("{:.2}", v),
            slider(*min..=*max, *v, move |x| Message::Control(name, Value::Float(x)))
                .step((max - min) / FLOAT_STEPS)
                .into(),
        ),
        (Domain::Int { min, max }, Value::Int(v)) => labelled(
            spec.label,
            v.to_string(),
            int_slider(*min, *max, *v, move |x| Message::Control(name, Value::Int(x))),
        ),
        (Domain::IntRange { min, max }, Value::IntRange(lo, hi)) => {
            let (lo, hi) = (*lo, *hi);
            labelled(
                spec.label,
                format!("{} to {}", lo, hi),
                column![
                    int_slider(*min, *max, lo, move |x| Message::Control(name, Value::IntRange(x, hi))),
                    int_slider(*min, *max, hi, move |x| Message::Control(name, Value::IntRange(lo, x))),
                ]
                .spacing(4)
                .into(),
            )
        }
        (Domain::Choice(options), Value::Choice(current)) => column![
            text(spec.label).size(14),
            pick_list(options.as_slice(), Some(current), move |choice: String| {
                Message::Control(name, Value::Choice(choice))
            })
            .width(Length::Fill),
        ]
        .spacing(4)
        .into(),
        (Domain::Toggle, Value::Toggle(on)) => checkbox(spec.label, *on)
            .on_toggle(move |b| Message::Control(name, Value::Toggle(b)))
            .into(),
        _ => text(format!("{}: {}", spec.label, value)).size(14).into(),
    }
}

/// Integer slider; iced sliders only take values convertible to `f64`, so
/// the position moves in whole steps over `f64` and is rounded back.
fn int_slider<'a>(
    min: i64,
    max: i64,
    value: i64,
    on_change: impl Fn(i64) -> Message + 'a,
) -> Element<'a, Message> {
    slider(min as f64..=max as f64, value as f64, move |x| on_change(whole(x)))
        .step(1.0)
        .into()
}

fn whole(x: f64) -> i64 {
    x.round() as i64
}

fn labelled<'a>(label: &'a str, value: String, widget: Element<'a, Message>) -> Element<'a, Message> {
    column![row![text(label).size(14), horizontal_space(), text(value).size(14)], widget]
        .spacing(4)
        .into()
}

/// The control sidebar: the given controls, a reset button and the text of
/// the last rejected update.
pub fn sidebar<'a>(
    controls: Vec<Element<'a, Message>>,
    reset_label: &'a str,
    notice: Option<&'a str>,
) -> Element<'a, Message> {
    let mut sections = column(controls).spacing(14);
    sections = sections.push(Space::with_height(6));
    sections = sections.push(
        button(text(reset_label).size(14).width(Length::Fill))
            .padding([6, 10])
            .on_press(Message::Reset),
    );
    if let Some(notice) = notice {
        sections = sections.push(text(notice).size(12).color(NOTICE_COLOR));
    }

    container(sections.padding(15))
        .width(Length::Fixed(280.0))
        .height(Length::Fill)
        .into()
}

/// Text for a chart whose frame is undefined.
pub fn undefined(error: &LabError) -> String {
    if error.is_degenerate() { error.to_string() } else { format!("undefined: {}", error) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_positions_round_to_whole_values() {
        assert_eq!(whole(3.0), 3);
        assert_eq!(whole(2.6), 3);
        assert_eq!(whole(-1.4), -1);
        assert_eq!(whole(2021.0), 2021);
    }

    #[test]
    fn test_every_signal_control_builds_a_widget() {
        let store = labkit_core::signal::signal_store().unwrap();
        for (spec, value) in store.controls() {
            let _ = control(spec, value);
        }
    }
}

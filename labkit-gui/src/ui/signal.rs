//! # Signal View
//!
//! Sidebar with the harmonic, noise and filter controls; two charts side by
//! side. The left chart overlays the noisy signal (solid) on the clean
//! harmonic (dashed); the right chart shows the filtered signal, or only a
//! "(disabled)" title while the filter is off.

use super::{sidebar, undefined};
use crate::widgets::LineStyle;
use crate::widgets::line_chart::{LineChart, Series};
use crate::{LabApp, Message};
use iced::widget::{Space, column, row, text};
use iced::{Color, Element, Length};
use labkit_core::signal::{SignalDerivation, SignalFrame};

const CLEAN_COLOR: Color = Color::from_rgb(0.85, 0.85, 0.85);
const NOISY_COLOR: Color = Color::from_rgb(0.20, 0.60, 0.86);
const FILTERED_COLOR: Color = Color::from_rgb(0.18, 0.80, 0.44);

const SIGNAL_TITLE: &str = "Harmonic with noise";
const FILTERED_TITLE: &str = "Filtered signal";

pub fn view(app: &LabApp<SignalDerivation>) -> Element<'_, Message> {
    let controls = app
        .session()
        .store()
        .controls()
        .map(|(spec, value)| super::control(spec, value))
        .collect();
    let panel = sidebar(controls, "Reset", app.notice());

    let (left, right) = match app.sink().frame() {
        Some(Ok(frame)) => (signal_chart(frame), filtered_chart(frame)),
        Some(Err(e)) => (
            LineChart::placeholder(SIGNAL_TITLE, undefined(e)),
            LineChart::placeholder(FILTERED_TITLE, undefined(e)),
        ),
        None => (
            LineChart::placeholder(SIGNAL_TITLE, "waiting for first frame"),
            LineChart::placeholder(FILTERED_TITLE, ""),
        ),
    };

    row![
        column![
            text("Harmonic signal lab").size(28),
            Space::with_height(10),
            row![left.view(), Space::with_width(10), right.view()].height(Length::Fill),
        ]
        .width(Length::Fill)
        .padding(20),
        panel,
    ]
    .into()
}

fn signal_chart(frame: &SignalFrame) -> LineChart {
    LineChart::new(
        SIGNAL_TITLE,
        vec![
            Series::new("noisy", &frame.t, &frame.noisy, NOISY_COLOR, LineStyle::Solid),
            Series::new("clean", &frame.t, &frame.clean, CLEAN_COLOR, LineStyle::Dashed),
        ],
    )
}

fn filtered_chart(frame: &SignalFrame) -> LineChart {
    match &frame.filtered {
        Some(filtered) => LineChart::new(
            FILTERED_TITLE,
            vec![Series::new("filtered", &frame.t, filtered, FILTERED_COLOR, LineStyle::Solid)],
        ),
        None => LineChart::placeholder(format!("{} (disabled)", FILTERED_TITLE), ""),
    }
}

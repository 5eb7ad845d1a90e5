//! # Regression View
//!
//! Scatter of the synthetic sample with the own fit (solid), the reference
//! fit (dashed) and the true line (dash-dot), next to the printed report.

use crate::widgets::LineStyle;
use crate::widgets::scatter_plot::{Overlay, ScatterPlot};
use crate::{Message, RegressionWindow};
use iced::widget::{Space, column, container, row, text};
use iced::{Color, Element, Length};
use labkit_core::regression::LineFit;

fn overlay(name: &str, fit: &LineFit, color: Color, style: LineStyle) -> Overlay {
    Overlay { name: name.to_string(), intercept: fit.intercept, slope: fit.slope, color, style }
}

pub fn view(window: &RegressionWindow) -> Element<'_, Message> {
    let report = window.report();
    let sample = &report.sample;
    let points = sample.x.iter().copied().zip(sample.y.iter().copied()).collect();
    let plot = ScatterPlot::new(
        "Least squares fit",
        points,
        vec![
            overlay("own fit", &report.own, Color::from_rgb(0.20, 0.60, 0.86), LineStyle::Solid),
            overlay("reference fit", &report.reference, Color::from_rgb(0.90, 0.30, 0.24), LineStyle::Dashed),
            overlay("true line", &sample.truth, Color::from_rgb(0.18, 0.80, 0.44), LineStyle::DashDot),
        ],
    );

    let summary = column![
        text("Own implementation").size(16),
        text(report.own.to_string()).size(14),
        Space::with_height(10),
        text("Reference fit").size(16),
        text(report.reference.to_string()).size(14),
        Space::with_height(10),
        text("True line").size(16),
        text(sample.truth.to_string()).size(14),
    ]
    .spacing(4);

    row![
        container(plot.view()).width(Length::Fill).height(Length::Fill),
        container(summary).width(Length::Fixed(260.0)).padding(15),
    ]
    .padding(20)
    .into()
}

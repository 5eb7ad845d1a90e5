//! # Chart Widgets
//!
//! Canvas programs used by the lab windows. Every chart is redrawn from the
//! frame it was built with; none of them keeps state between renders.

pub mod bar_chart;
pub mod line_chart;
pub mod scatter_plot;

use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{Frame, LineDash, Path, Stroke, Text};
use iced::{Color, Point, Size};

const MARGIN_LEFT: f32 = 56.0;
const MARGIN_RIGHT: f32 = 16.0;
const MARGIN_TOP: f32 = 32.0;
const MARGIN_BOTTOM: f32 = 28.0;
const TICKS: usize = 5;

/// How a series line is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
}

impl LineStyle {
    pub fn stroke(self, color: Color, width: f32) -> Stroke<'static> {
        let segments: &'static [f32] = match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[8.0, 5.0],
            LineStyle::DashDot => &[8.0, 4.0, 2.0, 4.0],
        };
        Stroke {
            line_dash: LineDash { segments, offset: 0 },
            ..Stroke::default().with_color(color).with_width(width)
        }
    }
}

/// Smallest and largest finite value, widened when they coincide.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return None;
    }
    if lo == hi {
        return Some((lo - 1.0, hi + 1.0));
    }
    Some((lo, hi))
}

/// Adds a fraction of the span on both sides.
pub fn pad((lo, hi): (f64, f64), fraction: f64) -> (f64, f64) {
    let margin = (hi - lo) * fraction;
    (lo - margin, hi + margin)
}

/// Maps data coordinates onto the drawable part of a canvas.
pub struct PlotArea {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    x: (f64, f64),
    y: (f64, f64),
}

impl PlotArea {
    pub fn new(size: Size, x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (size.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (size.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
            x,
            y,
        }
    }

    pub fn map(&self, x: f64, y: f64) -> Point {
        let fx = ((x - self.x.0) / (self.x.1 - self.x.0)) as f32;
        let fy = ((y - self.y.0) / (self.y.1 - self.y.0)) as f32;
        Point::new(self.left + fx * self.width, self.top + (1.0 - fy) * self.height)
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Draws the frame rectangle plus tick labels on both axes.
    pub fn draw_axes(&self, frame: &mut Frame, color: Color, x_label: impl Fn(f64) -> String) {
        let border = Path::rectangle(Point::new(self.left, self.top), Size::new(self.width, self.height));
        frame.stroke(&border, Stroke::default().with_color(color).with_width(1.0));

        for i in 0..=TICKS {
            let f = i as f64 / TICKS as f64;
            let xv = self.x.0 + f * (self.x.1 - self.x.0);
            let yv = self.y.0 + f * (self.y.1 - self.y.0);

            let px = self.map(xv, self.y.0);
            frame.fill_text(label(x_label(xv), Point::new(px.x, self.bottom() + 4.0), color, Horizontal::Center, Vertical::Top));

            let py = self.map(self.x.0, yv);
            frame.fill_text(label(format_tick(yv), Point::new(self.left - 6.0, py.y), color, Horizontal::Right, Vertical::Center));
        }
    }

    pub fn polyline(&self, points: &[(f64, f64)]) -> Path {
        Path::new(|builder| {
            let mut started = false;
            for &(x, y) in points {
                if !x.is_finite() || !y.is_finite() {
                    started = false;
                    continue;
                }
                let p = self.map(x, y);
                if started {
                    builder.line_to(p);
                } else {
                    builder.move_to(p);
                    started = true;
                }
            }
        })
    }
}

pub fn format_tick(v: f64) -> String {
    if v.abs() >= 1000.0 || (v != 0.0 && v.abs() < 0.01) {
        format!("{:.1e}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn label(content: String, position: Point, color: Color, horizontal: Horizontal, vertical: Vertical) -> Text {
    Text {
        content,
        position,
        color,
        size: 11.0.into(),
        horizontal_alignment: horizontal,
        vertical_alignment: vertical,
        ..Text::default()
    }
}

pub fn draw_title(frame: &mut Frame, title: &str, width: f32, color: Color) {
    frame.fill_text(Text {
        content: title.to_string(),
        position: Point::new(width / 2.0, 14.0),
        color,
        size: 16.0.into(),
        horizontal_alignment: Horizontal::Center,
        vertical_alignment: Vertical::Center,
        ..Text::default()
    });
}

/// Placeholder for a chart whose frame could not be derived.
pub fn draw_message(frame: &mut Frame, message: &str, color: Color) {
    frame.fill_text(Text {
        content: message.to_string(),
        position: frame.center(),
        color,
        size: 14.0.into(),
        horizontal_alignment: Horizontal::Center,
        vertical_alignment: Vertical::Center,
        ..Text::default()
    });
}

pub fn draw_legend(frame: &mut Frame, entries: &[(&str, Color, LineStyle)], right: f32, color: Color) {
    for (i, (name, line, style)) in entries.iter().enumerate() {
        let y = MARGIN_TOP + 12.0 + i as f32 * 16.0;
        let x = right - MARGIN_RIGHT - 120.0;
        frame.stroke(&Path::line(Point::new(x, y), Point::new(x + 24.0, y)), style.stroke(*line, 2.0));
        frame.fill_text(label(name.to_string(), Point::new(x + 30.0, y), color, Horizontal::Left, Vertical::Center));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_skips_non_finite_values() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, f64::INFINITY]), Some((-1.0, 3.0)));
        assert_eq!(extent([2.0, 2.0]), Some((1.0, 3.0)));
        assert_eq!(extent(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_plot_area_maps_corners() {
        let area = PlotArea::new(Size::new(200.0 + MARGIN_LEFT + MARGIN_RIGHT, 100.0 + MARGIN_TOP + MARGIN_BOTTOM), (0.0, 10.0), (-1.0, 1.0));
        let lower_left = area.map(0.0, -1.0);
        let upper_right = area.map(10.0, 1.0);
        assert_eq!(lower_left, Point::new(MARGIN_LEFT, MARGIN_TOP + 100.0));
        assert_eq!(upper_right, Point::new(MARGIN_LEFT + 200.0, MARGIN_TOP));
    }
}

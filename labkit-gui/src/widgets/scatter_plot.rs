//! # Scatter Plot Widget
//!
//! Sample points with fitted lines drawn over them.

use super::{LineStyle, PlotArea, draw_legend, draw_message, draw_title, extent, pad};
use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{Color, Element, Length, Rectangle, Renderer, Theme, mouse};

const POINT_COLOR: Color = Color::from_rgb(0.55, 0.55, 0.60);

/// A straight line `y = intercept + slope * x` drawn across the x range.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub name: String,
    pub intercept: f64,
    pub slope: f64,
    pub color: Color,
    pub style: LineStyle,
}

pub struct ScatterPlot {
    title: String,
    points: Vec<(f64, f64)>,
    overlays: Vec<Overlay>,
}

impl ScatterPlot {
    pub fn new(title: impl Into<String>, points: Vec<(f64, f64)>, overlays: Vec<Overlay>) -> Self {
        Self { title: title.into(), points, overlays }
    }

    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        container(canvas::Canvas::new(self).width(Length::Fill).height(Length::Fill)).into()
    }
}

impl<Message> canvas::Program<Message> for ScatterPlot {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let text_color = theme.palette().text;
        draw_title(&mut frame, &self.title, bounds.width, text_color);

        let Some(x_range) = extent(self.points.iter().map(|p| p.0)) else {
            draw_message(&mut frame, "no data", text_color);
            return vec![frame.into_geometry()];
        };
        let line_ends = self
            .overlays
            .iter()
            .flat_map(|o| [o.intercept + o.slope * x_range.0, o.intercept + o.slope * x_range.1]);
        let Some(y_range) = extent(self.points.iter().map(|p| p.1).chain(line_ends)) else {
            draw_message(&mut frame, "no data", text_color);
            return vec![frame.into_geometry()];
        };

        let area = PlotArea::new(bounds.size(), x_range, pad(y_range, 0.05));
        area.draw_axes(&mut frame, text_color, super::format_tick);

        for &(x, y) in &self.points {
            if x.is_finite() && y.is_finite() {
                frame.fill(&Path::circle(area.map(x, y), 3.0), POINT_COLOR);
            }
        }
        for overlay in &self.overlays {
            let ends = [
                (x_range.0, overlay.intercept + overlay.slope * x_range.0),
                (x_range.1, overlay.intercept + overlay.slope * x_range.1),
            ];
            frame.stroke(&area.polyline(&ends), overlay.style.stroke(overlay.color, 2.0));
        }

        let legend: Vec<(&str, Color, LineStyle)> =
            self.overlays.iter().map(|o| (o.name.as_str(), o.color, o.style)).collect();
        draw_legend(&mut frame, &legend, bounds.width, text_color);

        vec![frame.into_geometry()]
    }
}

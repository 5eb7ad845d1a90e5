//! # Line Chart Widget
//!
//! Plots one or more series against a shared x axis. Used for the signal
//! panels and the dashboard trend.

use super::{LineStyle, PlotArea, draw_legend, draw_message, draw_title, extent, format_tick, pad};
use iced::widget::canvas::{self, Geometry};
use iced::widget::container;
use iced::{Color, Element, Length, Rectangle, Renderer, Theme, mouse};

/// One plotted line.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub color: Color,
    pub style: LineStyle,
}

impl Series {
    /// Pairs `xs` with `ys` element-wise.
    pub fn new(name: impl Into<String>, xs: &[f64], ys: &[f64], color: Color, style: LineStyle) -> Self {
        Self {
            name: name.into(),
            points: xs.iter().copied().zip(ys.iter().copied()).collect(),
            color,
            style,
        }
    }
}

pub struct LineChart {
    title: String,
    series: Vec<Series>,
    /// Shown instead of the plot when set.
    message: Option<String>,
    x_format: fn(f64) -> String,
}

impl LineChart {
    pub fn new(title: impl Into<String>, series: Vec<Series>) -> Self {
        Self { title: title.into(), series, message: None, x_format: format_tick }
    }

    /// A chart with a title and a centred message but no data.
    pub fn placeholder(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), series: Vec::new(), message: Some(message.into()), x_format: format_tick }
    }

    pub fn x_format(mut self, format: fn(f64) -> String) -> Self {
        self.x_format = format;
        self
    }

    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        container(canvas::Canvas::new(self).width(Length::Fill).height(Length::Fill)).into()
    }
}

impl<Message> canvas::Program<Message> for LineChart {
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

        if let Some(message) = &self.message {
            draw_message(&mut frame, message, text_color);
            return vec![frame.into_geometry()];
        }

        let all = || self.series.iter().flat_map(|s| s.points.iter());
        let (Some(x_range), Some(y_range)) = (extent(all().map(|p| p.0)), extent(all().map(|p| p.1))) else {
            draw_message(&mut frame, "no data", text_color);
            return vec![frame.into_geometry()];
        };

        let area = PlotArea::new(bounds.size(), x_range, pad(y_range, 0.05));
        area.draw_axes(&mut frame, text_color, self.x_format);
        for series in &self.series {
            frame.stroke(&area.polyline(&series.points), series.style.stroke(series.color, 1.5));
        }

        if self.series.len() > 1 {
            let legend: Vec<(&str, Color, LineStyle)> =
                self.series.iter().map(|s| (s.name.as_str(), s.color, s.style)).collect();
            draw_legend(&mut frame, &legend, bounds.width, text_color);
        }

        vec![frame.into_geometry()]
    }
}

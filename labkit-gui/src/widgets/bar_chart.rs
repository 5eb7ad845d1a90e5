//! # Bar Chart Widget
//!
//! Vertical bars with category labels; one bar can be highlighted.

use super::{PlotArea, draw_message, draw_title, extent, pad};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::canvas::{self, Geometry, Path, Text};
use iced::widget::container;
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme, mouse};

const BAR_COLOR: Color = Color::from_rgb(0.20, 0.60, 0.86);
const HIGHLIGHT_COLOR: Color = Color::from_rgb(0.90, 0.30, 0.24);

#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub highlight: bool,
}

pub struct BarChart {
    title: String,
    bars: Vec<Bar>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self { title: title.into(), bars }
    }

    pub fn view<'a, Message: 'a>(self) -> Element<'a, Message> {
        container(canvas::Canvas::new(self).width(Length::Fill).height(Length::Fill)).into()
    }
}

impl<Message> canvas::Program<Message> for BarChart {
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

        if self.bars.is_empty() {
            draw_message(&mut frame, "no data", text_color);
            return vec![frame.into_geometry()];
        }
        // Bars grow from zero, so zero is always on the value axis.
        let y_range = extent(self.bars.iter().map(|b| b.value).chain([0.0])).unwrap_or((0.0, 1.0));

        let n = self.bars.len();
        let area = PlotArea::new(bounds.size(), (0.0, n as f64), pad(y_range, 0.05));
        area.draw_axes(&mut frame, text_color, |_| String::new());

        let slot = area.width() / n as f32;
        for (i, bar) in self.bars.iter().enumerate() {
            if !bar.value.is_finite() {
                continue;
            }
            let top = area.map(i as f64 + 0.1, bar.value.max(0.0));
            let base = area.map(i as f64 + 0.1, bar.value.min(0.0));
            let rect = Path::rectangle(Point::new(top.x, top.y), Size::new(slot * 0.8, base.y - top.y));
            frame.fill(&rect, if bar.highlight { HIGHLIGHT_COLOR } else { BAR_COLOR });

            frame.fill_text(Text {
                content: bar.label.clone(),
                position: Point::new(area.left() + slot * (i as f32 + 0.5), area.bottom() + 4.0),
                color: text_color,
                size: 10.0.into(),
                horizontal_alignment: Horizontal::Center,
                vertical_alignment: Vertical::Top,
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}

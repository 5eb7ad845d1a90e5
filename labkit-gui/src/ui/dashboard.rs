//! # Dashboard View
//!
//! Filter sidebar (index, region, week and year ranges, sort order, "Drop
//! filters") next to three tabs: the filtered table, the index trend for the
//! selected region, and the per-region comparison.

use super::{sidebar, undefined};
use crate::widgets::LineStyle;
use crate::widgets::bar_chart::{Bar, BarChart};
use crate::widgets::line_chart::{LineChart, Series};
use crate::{LabApp, Message, Tab};
use chrono::{Datelike, NaiveDate};
use iced::widget::{Row, Space, button, column, container, radio, row, scrollable, text};
use iced::{Color, Element, Length};
use labkit_core::Value;
use labkit_core::dashboard::{DashboardDerivation, DashboardFrame, SortOrder, TrendX, controls};

const TREND_COLOR: Color = Color::from_rgb(0.18, 0.80, 0.44);
const CELL_WIDTH: f32 = 110.0;
const TABLE_HEADER: [&str; 6] = ["Region", "Year", "Week", "VCI", "TCI", "VHI"];

pub fn view(app: &LabApp<DashboardDerivation>) -> Element<'_, Message> {
    let items = app
        .session()
        .store()
        .controls()
        .map(|(spec, value)| {
            if spec.name == controls::SORT_ORDER {
                sort_radios(spec.label, value)
            } else {
                super::control(spec, value)
            }
        })
        .collect();
    let panel = sidebar(items, "Drop filters", app.notice());

    let tabs = Row::with_children(Tab::ALL.into_iter().map(|tab| {
        let b = button(text(tab.title()).size(14)).padding([6, 14]);
        if tab == app.tab() { b.into() } else { b.on_press(Message::SelectTab(tab)).into() }
    }))
    .spacing(8);

    let body: Element<'_, Message> = match app.sink().frame() {
        Some(Ok(frame)) => match app.tab() {
            Tab::Table => table(frame),
            Tab::Plot => trend_chart(frame).view(),
            Tab::Comparison => comparison_chart(frame).view(),
        },
        Some(Err(e)) => LineChart::placeholder(app.tab().title(), undefined(e)).view(),
        None => text("No frame yet").into(),
    };

    row![
        panel,
        column![
            text("Vegetation indices").size(28),
            Space::with_height(10),
            tabs,
            Space::with_height(10),
            container(body).width(Length::Fill).height(Length::Fill),
        ]
        .width(Length::Fill)
        .padding(20),
    ]
    .into()
}

fn sort_radios<'a>(label: &'a str, value: &'a Value) -> Element<'a, Message> {
    let selected = match value {
        Value::Choice(key) => key.parse::<SortOrder>().ok(),
        _ => None,
    };
    let options = SortOrder::ALL.into_iter().map(|order| {
        radio(order.label(), order, selected, |o: SortOrder| {
            Message::Control(controls::SORT_ORDER, Value::Choice(o.key().to_string()))
        })
        .size(14)
        .into()
    });
    column![text(label).size(14), column(options).spacing(6)].spacing(4).into()
}

fn cell<'a>(content: String) -> Element<'a, Message> {
    text(content).size(13).width(Length::Fixed(CELL_WIDTH)).into()
}

fn table(frame: &DashboardFrame) -> Element<'_, Message> {
    if frame.rows.is_empty() {
        return text("No rows match the current filters").into();
    }
    let header = Row::with_children(TABLE_HEADER.iter().map(|h| cell(h.to_string())));
    let rows = frame.rows.iter().map(|r| {
        Row::with_children([
            cell(r.region_name.clone()),
            cell(r.year.to_string()),
            cell(r.week.to_string()),
            cell(format!("{:.2}", r.vci)),
            cell(format!("{:.2}", r.tci)),
            cell(format!("{:.2}", r.vhi)),
        ])
        .into()
    });
    column![
        header,
        Space::with_height(6),
        scrollable(column(rows).spacing(2)).height(Length::Fill),
        text(format!("{} rows", frame.rows.len())).size(12),
    ]
    .into()
}

fn date_tick(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn row_tick(x: f64) -> String {
    format!("{:.0}", x)
}

fn trend_chart(frame: &DashboardFrame) -> LineChart {
    let params = &frame.params;
    let mut by_date = true;
    let points: Vec<(f64, f64)> = frame
        .trend
        .iter()
        .map(|p| match p.x {
            TrendX::Date(d) => (d.num_days_from_ce() as f64, p.value),
            TrendX::Row(i) => {
                by_date = false;
                (i as f64, p.value)
            }
        })
        .collect();
    let series = Series { name: params.index_kind.to_string(), points, color: TREND_COLOR, style: LineStyle::Solid };
    let title = format!("{} for {}", params.index_kind, params.region);
    let x_format: fn(f64) -> String = if by_date { date_tick } else { row_tick };
    LineChart::new(title, vec![series]).x_format(x_format)
}

fn comparison_chart(frame: &DashboardFrame) -> BarChart {
    let bars = frame
        .comparison
        .iter()
        .map(|b| Bar { label: b.region.clone(), value: b.mean, highlight: b.highlight })
        .collect();
    BarChart::new(format!("Mean {} by region", frame.params.index_kind), bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_ticks_round_trip() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(date_tick(d.num_days_from_ce() as f64), "2021-03-15");
        assert_eq!(row_tick(3.0), "3");
    }
}

//! Inline SVG line charts.

use super::escape;

const WIDTH: f64 = 560.0;
const HEIGHT: f64 = 340.0;
const LEFT: f64 = 52.0;
const RIGHT: f64 = 14.0;
const TOP: f64 = 34.0;
const BOTTOM: f64 = 28.0;
const TICKS: usize = 5;

/// One polyline of a chart.
pub struct Line<'a> {
    pub name: &'a str,
    pub xs: &'a [f64],
    pub ys: &'a [f64],
    pub color: &'a str,
    pub dashed: bool,
}

fn extent<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    match lo.partial_cmp(&hi)? {
        std::cmp::Ordering::Greater => None,
        std::cmp::Ordering::Equal => Some((lo - 1.0, hi + 1.0)),
        std::cmp::Ordering::Less => Some((lo, hi)),
    }
}

fn open(title: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\
         <text x=\"{cx}\" y=\"20\" text-anchor=\"middle\" class=\"title\">{t}</text>",
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        t = escape(title)
    )
}

/// A chart with only a title and a centred message.
pub fn placeholder(title: &str, message: &str) -> String {
    format!(
        "{}<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text></svg>",
        open(title),
        WIDTH / 2.0,
        HEIGHT / 2.0,
        escape(message)
    )
}

/// Renders `lines` on shared axes.
pub fn line_chart(title: &str, lines: &[Line<'_>]) -> String {
    let x_range = extent(lines.iter().flat_map(|l| l.xs.iter()));
    let y_range = extent(lines.iter().flat_map(|l| l.ys.iter()));
    let (Some((x0, x1)), Some((y0, y1))) = (x_range, y_range) else {
        return placeholder(title, "no data");
    };
    let margin = (y1 - y0) * 0.05;
    let (y0, y1) = (y0 - margin, y1 + margin);

    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;
    let map = |x: f64, y: f64| (LEFT + (x - x0) / (x1 - x0) * plot_w, TOP + (1.0 - (y - y0) / (y1 - y0)) * plot_h);

    let mut svg = open(title);
    svg.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" class=\"axis\"/>",
        LEFT, TOP, plot_w, plot_h
    ));
    for i in 0..=TICKS {
        let f = i as f64 / TICKS as f64;
        let (px, _) = map(x0 + f * (x1 - x0), y0);
        let (_, py) = map(x0, y0 + f * (y1 - y0));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" class=\"tick\">{:.2}</text>",
            px,
            TOP + plot_h + 16.0,
            x0 + f * (x1 - x0)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" class=\"tick\">{:.2}</text>",
            LEFT - 6.0,
            py + 4.0,
            y0 + f * (y1 - y0)
        ));
    }

    for (i, line) in lines.iter().enumerate() {
        let points: Vec<String> = line
            .xs
            .iter()
            .zip(line.ys)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| {
                let (px, py) = map(x, y);
                format!("{:.2},{:.2}", px, py)
            })
            .collect();
        let dash = if line.dashed { " stroke-dasharray=\"6 4\"" } else { "" };
        svg.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"{}/>",
            points.join(" "),
            line.color,
            dash
        ));

        let ly = TOP + 14.0 + i as f64 * 16.0;
        let lx = WIDTH - RIGHT - 110.0;
        svg.push_str(&format!(
            "<line x1=\"{}\" y1=\"{ly}\" x2=\"{}\" y2=\"{ly}\" stroke=\"{}\" stroke-width=\"2\"{}/>\
             <text x=\"{}\" y=\"{}\" class=\"tick\">{}</text>",
            lx,
            lx + 22.0,
            line.color,
            dash,
            lx + 28.0,
            ly + 4.0,
            escape(line.name),
            ly = ly
        ));
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_contains_one_polyline_per_line() {
        let xs = [0.0, 1.0, 2.0];
        let a = [0.0, 1.0, 0.0];
        let b = [1.0, 1.0, 1.0];
        let svg = line_chart(
            "Signal",
            &[
                Line { name: "a", xs: &xs, ys: &a, color: "#3498db", dashed: false },
                Line { name: "b", xs: &xs, ys: &b, color: "#ccc", dashed: true },
            ],
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches("stroke-dasharray").count(), 2);
    }

    #[test]
    fn test_empty_chart_is_a_placeholder() {
        let svg = line_chart("Empty", &[]);
        assert!(svg.contains("no data"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_titles_are_escaped() {
        assert!(placeholder("a < b", "x & y").contains("a &lt; b"));
    }
}

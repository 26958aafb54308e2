//! Time chart rendering.
//!
//! The terminal chart widget has a single vertical axis, so every series is
//! scaled into `[0, 1]` against its own [`YAxis`] bounds. The y labels show
//! the ticks of axis 1 and each legend entry carries its axis number, side
//! and range.

use chrono::DateTime;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{AxisPosition, ChartSpec, Series, YAxis};

/// Scale `value` into `[0, 1]` within `bounds`.
pub fn normalize(value: f64, bounds: [f64; 2]) -> f64 {
    let span = bounds[1] - bounds[0];
    if span <= 0.0 {
        return 0.5;
    }
    ((value - bounds[0]) / span).clamp(0.0, 1.0)
}

/// Legend text for a series.
pub fn legend_label(series: &Series, axis: Option<&YAxis>) -> String {
    match axis {
        Some(axis) => {
            let side = match axis.position {
                AxisPosition::Left => "L",
                AxisPosition::Right => "R",
            };
            format!(
                "{} [{}{} {}..{}]",
                series.label,
                side,
                axis.index,
                axis.tick(axis.bounds[0]),
                axis.tick(axis.bounds[1])
            )
        }
        None => series.label.clone(),
    }
}

/// Clock time of an epoch-millisecond x value.
pub fn time_label(ms: f64) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Series points scaled against their axis.
fn scaled_points(spec: &ChartSpec) -> Vec<Vec<(f64, f64)>> {
    spec.series
        .iter()
        .map(|series| {
            let bounds = spec.axis(series.axis).map_or([0.0, 1.0], |a| a.bounds);
            series
                .points
                .iter()
                .map(|&(t, v)| (t as f64, normalize(v, bounds)))
                .collect()
        })
        .collect()
}

/// Render the chart of the current node.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Chart ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(spec) = app.current_node().and_then(|node| app.console.chart(node)) else {
        let empty = Paragraph::new(" Nothing plotted")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    if spec.is_empty() {
        let hint = if spec.series.is_empty() {
            " Nothing plotted. Select a statistic and press Space"
        } else {
            " Waiting for data points..."
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let points = scaled_points(spec);
    let mut datasets = Vec::new();
    for (i, (series, data)) in spec.series.iter().zip(&points).enumerate() {
        let style = Style::default().fg(app.theme.series_color(i));
        if series.show_lines {
            datasets.push(
                Dataset::default()
                    .name(legend_label(series, spec.axis(series.axis)))
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(style)
                    .data(data),
            );
        }
        if series.show_points {
            let scatter = Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(style)
                .data(data);
            // Name the scatter set only when it is the sole representation.
            let scatter = if series.show_lines {
                scatter
            } else {
                scatter.name(legend_label(series, spec.axis(series.axis)))
            };
            datasets.push(scatter);
        }
    }

    let [start, end] = spec.x_axis.bounds;
    let x_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds(spec.x_axis.bounds)
        .labels(vec![
            Span::raw(time_label(start)),
            Span::raw(time_label((start + end) / 2.0)),
            Span::raw(time_label(end)),
        ]);

    let y_labels = match spec.y_axes.first() {
        Some(axis) => {
            let [lo, hi] = axis.bounds;
            vec![
                Span::raw(axis.tick(lo)),
                Span::raw(axis.tick((lo + hi) / 2.0)),
                Span::raw(axis.tick(hi)),
            ]
        }
        None => Vec::new(),
    };
    let y_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, 1.0])
        .labels(y_labels);

    let mut chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);
    if spec.legend {
        chart = chart
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Percentage(90), Constraint::Percentage(90)));
    } else {
        chart = chart.legend_position(None);
    }

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{StatKey, TickFormatter};

    fn series() -> Series {
        Series {
            key: StatKey::plain("vm.free-memory"),
            label: "Free Memory".into(),
            axis: 2,
            points: vec![(1000, 1_048_576.0), (2000, 3_145_728.0)],
            show_points: true,
            show_lines: true,
        }
    }

    #[test]
    fn normalize_scales_into_unit_range() {
        assert_eq!(normalize(5.0, [0.0, 10.0]), 0.5);
        assert_eq!(normalize(20.0, [0.0, 10.0]), 1.0);
        assert_eq!(normalize(3.0, [3.0, 3.0]), 0.5);
    }

    #[test]
    fn legend_names_axis_and_range() {
        let axis = YAxis {
            index: 2,
            position: AxisPosition::Right,
            formatter: Some(TickFormatter::Megabytes),
            bounds: [1_048_576.0, 3_145_728.0],
        };
        assert_eq!(legend_label(&series(), Some(&axis)), "Free Memory [R2 1mb..3mb]");
        assert_eq!(legend_label(&series(), None), "Free Memory");
    }

    #[test]
    fn time_labels_are_clock_times() {
        assert_eq!(time_label(0.0), "00:00:00");
        assert_eq!(time_label(3_661_000.0), "01:01:01");
    }
}

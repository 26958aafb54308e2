//! Multi-axis time chart assembly.
//!
//! Every plotted statistic gets its own vertical axis so that series with
//! very different magnitudes (bytes next to GC counts) stay readable. Axes
//! are numbered from 1 and alternate sides: odd axes on the left, even axes
//! on the right.

use super::format::TickFormatter;
use super::history::{History, Point};
use super::key::StatKey;
use super::registry::{Labels, StatRegistry};
use super::selection::PlotSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    Left,
    Right,
}

impl AxisPosition {
    /// Side of the axis with the given 1-based index.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 1 {
            AxisPosition::Left
        } else {
            AxisPosition::Right
        }
    }
}

/// A vertical axis owned by one series.
#[derive(Debug, Clone, PartialEq)]
pub struct YAxis {
    /// 1-based axis number.
    pub index: usize,
    pub position: AxisPosition,
    pub formatter: Option<TickFormatter>,
    /// Min and max of the series' values.
    pub bounds: [f64; 2],
}

impl YAxis {
    /// Tick label for a value on this axis.
    pub fn tick(&self, value: f64) -> String {
        match self.formatter {
            Some(formatter) => formatter.format(value),
            None => super::format::format_number((value * 100.0).round() / 100.0),
        }
    }
}

/// Horizontal time axis, epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub bounds: [f64; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: StatKey,
    pub label: String,
    /// Index of the series' [`YAxis`].
    pub axis: usize,
    pub points: Vec<Point>,
    pub show_points: bool,
    pub show_lines: bool,
}

/// Everything needed to draw a node's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub node: String,
    pub x_axis: TimeAxis,
    pub y_axes: Vec<YAxis>,
    pub series: Vec<Series>,
    pub legend: bool,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn axis(&self, index: usize) -> Option<&YAxis> {
        self.y_axes.iter().find(|a| a.index == index)
    }
}

/// Build the chart of a node from its plot selection and history.
///
/// The chart is rebuilt from scratch on every call.
pub fn assemble(
    node: &str,
    history: &History,
    selection: &PlotSelection,
    registry: &StatRegistry,
    labels: &Labels,
) -> ChartSpec {
    let mut y_axes = Vec::new();
    let mut series = Vec::new();

    for (i, key) in selection.selected(node).enumerate() {
        let index = i + 1;
        let points = history.series_for(node, key);

        y_axes.push(YAxis {
            index,
            position: AxisPosition::for_index(index),
            formatter: registry.chart_formatter(key),
            bounds: value_bounds(&points),
        });

        series.push(Series {
            key: key.clone(),
            label: labels.series_label(key),
            axis: index,
            points,
            show_points: true,
            show_lines: true,
        });
    }

    ChartSpec {
        node: node.to_string(),
        x_axis: TimeAxis {
            bounds: time_bounds(history, node),
        },
        y_axes,
        series,
        legend: true,
    }
}

fn value_bounds(points: &[Point]) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(_, v) in points {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() {
        return [0.0, 1.0];
    }
    if min == max {
        // Flat series: give the axis some height around the value.
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return [min - pad, max + pad];
    }
    [min, max]
}

fn time_bounds(history: &History, node: &str) -> [f64; 2] {
    let mut snapshots = history.snapshots(node);
    let first = snapshots.next().map(|s| s.zeit);
    let last = history.latest(node).map(|s| s.zeit);
    match (first, last) {
        (Some(first), Some(last)) if last > first => [first as f64, last as f64],
        (Some(at), _) => [at as f64 - 1.0, at as f64 + 1.0],
        _ => [0.0, 1.0],
    }
}

//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::PlotControl;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for connected nodes and pressed plot toggles.
    pub connected: Color,
    /// Color for errors and lost nodes.
    pub error: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows and group headings.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Line colors for chart series, reused in order.
    pub series: [Color; 6],
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            connected: Color::Green,
            error: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
            series: [
                Color::Yellow,
                Color::LightBlue,
                Color::LightGreen,
                Color::LightMagenta,
                Color::LightRed,
                Color::White,
            ],
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            connected: Color::Green,
            error: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
            series: [
                Color::Blue,
                Color::Magenta,
                Color::Red,
                Color::Green,
                Color::Cyan,
                Color::Black,
            ],
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color of the n-th chart series.
    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }

    /// Style for a row's plot toggle cell.
    pub fn plot_style(&self, plot: PlotControl) -> Style {
        match plot {
            PlotControl::Toggle { pressed: true } => {
                Style::default().fg(self.connected).add_modifier(Modifier::BOLD)
            }
            PlotControl::Toggle { pressed: false } => Style::default(),
            PlotControl::Unavailable => Style::default().add_modifier(Modifier::DIM),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_colors_cycle() {
        let theme = Theme::dark();
        assert_eq!(theme.series_color(0), theme.series_color(6));
        assert_ne!(theme.series_color(0), theme.series_color(1));
    }
}

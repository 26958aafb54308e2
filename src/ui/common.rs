//! Common UI components shared across views.
//!
//! This module contains the header bar, node tab bar, status bar, and help
//! overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_interval;

/// Render the header bar with connected node count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.console.node_count();

    let (status_icon, status_style) = if app.load_error.is_some() {
        ("●", Style::default().fg(app.theme.error))
    } else if count > 0 {
        ("●", Style::default().fg(app.theme.connected))
    } else {
        ("○", Style::default().add_modifier(Modifier::DIM))
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", status_icon), status_style),
        Span::styled("CLUSTERWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", count),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(if count == 1 { " node connected" } else { " nodes connected" }),
    ];

    if let Some(node) = app.current_node() {
        let snapshots = app.console.history().len(node);
        spans.push(Span::raw(format!(
            " │ {} snapshots of {}",
            snapshots,
            app.console.history().capacity()
        )));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar with one tab per connected node.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let nodes = app.nodes();
    if nodes.is_empty() {
        let waiting = Paragraph::new(" Waiting for nodes...")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(waiting, area);
        return;
    }

    let titles: Vec<Line> = nodes
        .iter()
        .map(|node| Line::from(format!(" {} ", node)))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_node_index().unwrap_or(0))
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, the statistics interval and the available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | q:quit", err))
            .style(Style::default().fg(app.theme.error));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = format!(
        " {} | every {} | ↑↓:select Space:plot +/-:interval Tab:node ?:help q:quit",
        app.source_description(),
        format_interval(app.statistics_interval()),
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab ←/→ h/l   Switch node"),
        Line::from("  ↑/↓ j/k       Select statistic"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Plotting",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Space/Enter   Toggle plot"),
        Line::from("  +             Poll less often (5s)"),
        Line::from("  -             Poll more often (5s)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  i             Toggle node info"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 20u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

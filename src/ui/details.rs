//! Node info panel.
//!
//! Shows the details descriptor fetched when a node connects, plus what the
//! console has recorded for it.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use crate::app::App;
use crate::data::format::{format_timestamp, raw_text};
use crate::data::Labels;

/// Label/value pairs of a details descriptor.
///
/// Objects list their fields; any other value is shown as a single entry.
pub fn detail_lines(details: &Value, labels: &Labels) -> Vec<(String, String)> {
    match details {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| (labels.label(key).to_string(), raw_text(value)))
            .collect(),
        other => vec![(String::new(), raw_text(other))],
    }
}

/// Render the info panel of the current node.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Node Info ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(node) = app.current_node() else {
        frame.render_widget(block, area);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(vec![
        Span::styled(format!(" {} ", node), bold),
        Span::styled("connected", Style::default().fg(app.theme.connected)),
    ])];

    if let Some(latest) = app.console.history().latest(node) {
        lines.push(Line::from(format!(
            " Last update: {}",
            format_timestamp(latest.zeit)
        )));
    }
    lines.push(Line::from(""));

    match app.console.details(node) {
        Some(details) => {
            for (label, value) in detail_lines(details, app.console.labels()) {
                lines.push(Line::from(vec![
                    Span::styled(format!(" {}: ", label), bold),
                    Span::raw(value),
                ]));
            }
        }
        None => lines.push(Line::from(Span::styled(
            " Loading details...",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LanguagePack;
    use serde_json::json;

    #[test]
    fn object_details_use_labels() {
        let (labels, _) = LanguagePack::builtin().unwrap().into_parts();
        let lines = detail_lines(&json!({"vm.up-time": 5, "custom": "x"}), &labels);
        assert!(lines.contains(&("Up-Time".to_string(), "5".to_string())));
        assert!(lines.contains(&("custom".to_string(), "x".to_string())));
    }

    #[test]
    fn scalar_details_are_one_line() {
        let lines = detail_lines(&json!("offline"), &Labels::default());
        assert_eq!(lines, vec![(String::new(), "offline".to_string())]);
    }
}

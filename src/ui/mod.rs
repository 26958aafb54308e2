//! Terminal UI rendering using ratatui.
//!
//! Each panel is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`stats`]: Stats table of the visible node with plot toggles
//! - [`chart`]: Multi-axis time chart of the plotted statistics
//! - [`details`]: Node info panel from the node's details descriptor
//! - [`common`]: Shared components (header, node tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Node tabs (common::render_tabs)      │
//! ├──────────────────┬───────────────────┤
//! │                  │ chart::render     │
//! │ stats::render    ├───────────────────┤
//! │                  │ details::render   │
//! ├──────────────────┴───────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod details;
pub mod stats;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::app::App;

/// Draw every panel of the console.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Node tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    let columns =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(chunks[2]);
    stats::render(frame, app, columns[0]);

    if app.show_details {
        let right = Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[1]);
        chart::render(frame, app, right[0]);
        details::render(frame, app, right[1]);
    } else {
        chart::render(frame, app, columns[1]);
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Console;
    use crate::data::LanguagePack;
    use crate::source::{ChannelSource, ConsoleEvent};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_tabs_table_and_chart() {
        let (labels, registry) = LanguagePack::builtin().unwrap().into_parts();
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::with_theme(
            Box::new(source),
            Console::new(labels, registry, 10),
            Theme::dark(),
        );

        tx.try_send(ConsoleEvent::Connectivity(BTreeMap::from([(
            "node1".to_string(),
            true,
        )])))
        .unwrap();
        for zeit in [1_000, 2_000] {
            tx.try_send(ConsoleEvent::Statistics(BTreeMap::from([(
                "node1".to_string(),
                Some(json!({"zeit": zeit, "vm.free-memory": zeit * 1024, "vm.up-time": 65_000})),
            )])))
            .unwrap();
        }
        app.reload_data();

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("node1"));
        assert!(text.contains("Free Memory"));
        assert!(text.contains("1m 5s"));
        assert!(text.contains("[x]"));
    }

    #[test]
    fn renders_without_nodes() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::with_theme(
            Box::new(source),
            Console::new(Default::default(), Default::default(), 10),
            Theme::dark(),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();
        assert!(buffer_text(&terminal).contains("Waiting for nodes"));
    }
}

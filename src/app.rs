//! Application state and navigation logic.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::console::{Connectivity, Console};
use crate::data::duration::format_interval;
use crate::data::{StatKey, TableRow};
use crate::source::{ConsoleEvent, EventSource};
use crate::ui::Theme;

/// Step used by the interval keys.
pub const INTERVAL_STEP: Duration = Duration::from_secs(5);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_details: bool,

    source: Box<dyn EventSource>,
    pub console: Console,
    pub load_error: Option<String>,

    // Navigation state
    current_node: Option<String>,
    pub selected_row: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading events from `source`.
    pub fn new(source: Box<dyn EventSource>, console: Console) -> Self {
        Self::with_theme(source, console, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn EventSource>, console: Console, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            show_details: true,
            source,
            console,
            load_error: None,
            current_node: None,
            selected_row: 0,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current event source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn statistics_interval(&self) -> Duration {
        self.source.statistics_interval()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Drain pending events from the source into the console.
    ///
    /// Returns true if any event was applied.
    pub fn reload_data(&mut self) -> bool {
        let mut applied = false;
        while let Some(event) = self.source.poll() {
            self.apply(event);
            applied = true;
        }
        self.load_error = self.source.error();
        applied
    }

    fn apply(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::Connectivity(report) => {
                for (node, connected) in report {
                    if self.console.on_connectivity_changed(&node, connected)
                        == Connectivity::Connected
                    {
                        self.source.request_details(&node);
                    }
                }
                self.sync_visible();
            }
            ConsoleEvent::Statistics(report) => {
                for (node, payload) in report {
                    self.console.on_statistics_received(&node, payload);
                }
                self.clamp_selected_row();
            }
            ConsoleEvent::Details { node, details } => {
                self.console.on_details_received(&node, details);
            }
        }
    }

    /// Keep the visible node pointing at a connected node.
    fn sync_visible(&mut self) {
        let still_connected = self
            .current_node
            .as_deref()
            .is_some_and(|node| self.console.is_connected(node));
        if !still_connected {
            self.current_node = self.console.nodes().next().map(str::to_string);
            self.selected_row = 0;
        }
        if self.console.visible() != self.current_node.as_deref() {
            let node = self.current_node.clone();
            self.console.set_visible(node.as_deref());
        }
    }

    /// Connected nodes in tab order.
    pub fn nodes(&self) -> Vec<&str> {
        self.console.nodes().collect()
    }

    pub fn current_node(&self) -> Option<&str> {
        self.current_node.as_deref()
    }

    /// Position of the current node in tab order.
    pub fn current_node_index(&self) -> Option<usize> {
        let current = self.current_node.as_deref()?;
        self.console.nodes().position(|n| n == current)
    }

    /// Switch to the next node tab.
    pub fn next_node(&mut self) {
        self.step_node(1);
    }

    /// Switch to the previous node tab.
    pub fn prev_node(&mut self) {
        let count = self.console.node_count();
        self.step_node(count.saturating_sub(1));
    }

    fn step_node(&mut self, offset: usize) {
        let nodes: Vec<String> = self.console.nodes().map(str::to_string).collect();
        if nodes.is_empty() {
            return;
        }
        let index = self.current_node_index().unwrap_or(0);
        let next = nodes[(index + offset) % nodes.len()].clone();
        debug!(node = %next, "switching node");
        self.console.set_visible(Some(&next));
        self.current_node = Some(next);
        self.selected_row = 0;
    }

    fn rows(&self) -> &[TableRow] {
        self.current_node
            .as_deref()
            .and_then(|node| self.console.table(node))
            .map(|table| table.rows())
            .unwrap_or_default()
    }

    /// Move selection down to the next statistic row.
    pub fn select_next(&mut self) {
        let rows = self.rows();
        if let Some(next) = (self.selected_row + 1..rows.len())
            .find(|&i| matches!(rows[i], TableRow::Stat(_)))
        {
            self.selected_row = next;
        }
    }

    /// Move selection up to the previous statistic row.
    pub fn select_prev(&mut self) {
        let rows = self.rows();
        if let Some(prev) = (0..self.selected_row.min(rows.len()))
            .rev()
            .find(|&i| matches!(rows[i], TableRow::Stat(_)))
        {
            self.selected_row = prev;
        }
    }

    fn clamp_selected_row(&mut self) {
        let len = self.rows().len();
        if self.selected_row >= len {
            self.selected_row = len.saturating_sub(1);
        }
        if matches!(self.rows().get(self.selected_row), Some(TableRow::Heading(_))) {
            self.select_next();
        }
    }

    /// Key of the highlighted statistic row.
    pub fn selected_key(&self) -> Option<&StatKey> {
        match self.rows().get(self.selected_row)? {
            TableRow::Stat(row) => Some(&row.key),
            TableRow::Heading(_) => None,
        }
    }

    /// Toggle plotting of the highlighted statistic.
    pub fn toggle_selected_plot(&mut self) {
        let Some(node) = self.current_node.clone() else {
            return;
        };
        let Some(key) = self.selected_key().cloned() else {
            return;
        };
        let label = self.console.labels().stat_label(&key);
        match self.console.on_plot_toggle(&node, &key) {
            Some(true) => self.set_status_message(format!("Plotting {}", label)),
            Some(false) => self.set_status_message(format!("Stopped plotting {}", label)),
            None => self.set_status_message(format!("{} cannot be plotted", label)),
        }
    }

    /// Poll statistics less often.
    pub fn slower(&mut self) {
        let interval = self.statistics_interval() + INTERVAL_STEP;
        self.change_interval(interval);
    }

    /// Poll statistics more often, down to the floor.
    pub fn faster(&mut self) {
        let interval = self.statistics_interval().saturating_sub(INTERVAL_STEP);
        self.change_interval(interval);
    }

    fn change_interval(&mut self, interval: Duration) {
        let applied = self.source.set_statistics_interval(interval);
        self.set_status_message(format!(
            "Statistics every {}",
            format_interval(applied)
        ));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Toggle the node info panel.
    pub fn toggle_details(&mut self) {
        self.show_details = !self.show_details;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GroupType, Labels, StatRegistry};
    use crate::source::ChannelSource;
    use serde_json::json;
    use std::collections::BTreeMap;
    use tokio::sync::mpsc;

    fn app() -> (mpsc::Sender<ConsoleEvent>, App) {
        let registry = StatRegistry::default()
            .with_group("bhs", GroupType::Tab)
            .with_plottable("vm.free-memory")
            .with_default_plot("vm.free-memory");
        let console = Console::new(Labels::default(), registry, 10);
        let (tx, source) = ChannelSource::create("test");
        (tx, App::with_theme(Box::new(source), console, Theme::dark()))
    }

    fn connect(tx: &mpsc::Sender<ConsoleEvent>, nodes: &[(&str, bool)]) {
        let report: BTreeMap<String, bool> =
            nodes.iter().map(|(n, c)| (n.to_string(), *c)).collect();
        tx.try_send(ConsoleEvent::Connectivity(report)).unwrap();
    }

    fn stats(tx: &mpsc::Sender<ConsoleEvent>, node: &str, zeit: i64) {
        let payload = json!({
            "zeit": zeit,
            "vm.free-memory": 1,
            "bhs!bhs-title": {"messages": 1},
            "vm.up-time": 2
        });
        let report = BTreeMap::from([(node.to_string(), Some(payload))]);
        tx.try_send(ConsoleEvent::Statistics(report)).unwrap();
    }

    #[test]
    fn first_connected_node_becomes_visible() {
        let (tx, mut app) = app();
        assert!(!app.reload_data());

        connect(&tx, &[("b", true), ("a", true), ("c", false)]);
        assert!(app.reload_data());
        assert_eq!(app.nodes(), vec!["a", "b"]);
        assert_eq!(app.current_node(), Some("a"));
        assert_eq!(app.console.visible(), Some("a"));
    }

    #[test]
    fn node_tabs_wrap_around() {
        let (tx, mut app) = app();
        connect(&tx, &[("a", true), ("b", true)]);
        app.reload_data();

        app.next_node();
        assert_eq!(app.current_node(), Some("b"));
        app.next_node();
        assert_eq!(app.current_node(), Some("a"));
        app.prev_node();
        assert_eq!(app.current_node(), Some("b"));
        assert_eq!(app.console.visible(), Some("b"));
    }

    #[test]
    fn visible_node_moves_on_disconnect() {
        let (tx, mut app) = app();
        connect(&tx, &[("a", true), ("b", true)]);
        app.reload_data();
        connect(&tx, &[("a", false), ("b", true)]);
        app.reload_data();
        assert_eq!(app.current_node(), Some("b"));
        assert_eq!(app.current_node_index(), Some(0));
    }

    #[test]
    fn row_selection_skips_headings() {
        let (tx, mut app) = app();
        connect(&tx, &[("a", true)]);
        stats(&tx, "a", 1);
        app.reload_data();

        // Sorted keys: heading "bhs", nested row, then the two vm rows.
        assert_eq!(app.selected_row, 1);
        let mut seen = vec![app.selected_key().cloned()];
        for _ in 0..5 {
            app.select_next();
            seen.push(app.selected_key().cloned());
        }
        assert!(seen.iter().all(Option::is_some));
        assert_eq!(app.selected_row, 3);

        for _ in 0..5 {
            app.select_prev();
        }
        assert_eq!(app.selected_row, 1);
    }

    #[test]
    fn toggle_reports_status() {
        let (tx, mut app) = app();
        connect(&tx, &[("a", true)]);
        stats(&tx, "a", 1);
        app.reload_data();

        while app.selected_key() != Some(&StatKey::plain("vm.free-memory")) {
            app.select_next();
        }
        app.toggle_selected_plot();
        assert_eq!(app.get_status_message(), Some("Stopped plotting vm.free-memory"));
        assert!(app.console.chart("a").unwrap().series.is_empty());

        app.select_next();
        app.toggle_selected_plot();
        assert_eq!(app.get_status_message(), Some("vm.up-time cannot be plotted"));
    }

    #[test]
    fn interval_keys_respect_floor() {
        let (_tx, mut app) = app();
        app.slower();
        assert_eq!(app.statistics_interval(), Duration::from_secs(10));
        assert_eq!(app.get_status_message(), Some("Statistics every 10s"));
        app.faster();
        app.faster();
        assert_eq!(app.statistics_interval(), Duration::from_secs(5));
    }

    #[test]
    fn details_arrive_for_connected_nodes() {
        let (tx, mut app) = app();
        connect(&tx, &[("a", true)]);
        tx.try_send(ConsoleEvent::Details {
            node: "a".into(),
            details: json!({"name": "a"}),
        })
        .unwrap();
        app.reload_data();
        assert_eq!(app.console.details("a"), Some(&json!({"name": "a"})));
    }
}

//! The console: single owner of per-node state.
//!
//! Events from an [`EventSource`](crate::source::EventSource) are fed in on
//! the UI thread, so no locking guards the history, plot selection or render
//! state.
//!
//! ```text
//! Connectivity ──▶ on_connectivity_changed ──▶ track / untrack + reset
//! Statistics   ──▶ on_statistics_received  ──▶ History ──▶ repaint if visible
//! Details      ──▶ on_details_received     ──▶ node info panel
//! key press    ──▶ on_plot_toggle          ──▶ PlotSelection ──▶ chart rebuild
//! ```

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::{
    chart, ChartSpec, History, Labels, PlotSelection, Repaint, Snapshot, StatKey, StatRegistry,
    StatsRenderer, StatsTable,
};

/// What a connectivity report changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// The node is newly connected; its details must be fetched.
    Connected,
    /// The node went away and its state was dropped.
    Disconnected,
    Unchanged,
}

/// What happened to a statistics payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// Recorded in history; the node is hidden so nothing was repainted.
    Recorded,
    /// Recorded and the visible table repainted.
    Repainted(Repaint),
    /// Dropped: null payload, unknown node, stale timestamp or bad shape.
    Skipped,
}

/// Coordinates history, plot selection and rendering for all nodes.
#[derive(Debug)]
pub struct Console {
    labels: Labels,
    registry: StatRegistry,
    history: History,
    selection: PlotSelection,
    renderer: StatsRenderer,
    charts: HashMap<String, ChartSpec>,
    details: HashMap<String, Value>,
    connected: BTreeSet<String>,
    visible: Option<String>,
}

impl Console {
    pub fn new(labels: Labels, registry: StatRegistry, history_size: usize) -> Self {
        let selection = PlotSelection::new(registry.default_series().to_vec());
        Self {
            labels,
            registry,
            history: History::new(history_size),
            selection,
            renderer: StatsRenderer::new(),
            charts: HashMap::new(),
            details: HashMap::new(),
            connected: BTreeSet::new(),
            visible: None,
        }
    }

    /// Apply a connect or disconnect report for one node.
    pub fn on_connectivity_changed(&mut self, node: &str, connected: bool) -> Connectivity {
        match (connected, self.connected.contains(node)) {
            (true, false) => {
                info!(node, "node connected");
                self.connected.insert(node.to_string());
                Connectivity::Connected
            }
            (false, true) => {
                info!(node, "node disconnected");
                self.connected.remove(node);
                self.renderer.reset(node);
                self.history.forget(node);
                self.charts.remove(node);
                self.details.remove(node);
                if self.visible.as_deref() == Some(node) {
                    self.visible = None;
                }
                Connectivity::Disconnected
            }
            _ => Connectivity::Unchanged,
        }
    }

    /// Ingest one node's statistics response.
    pub fn on_statistics_received(&mut self, node: &str, payload: Option<Value>) -> Ingest {
        let Some(payload) = payload else {
            debug!(node, "no statistics this cycle");
            return Ingest::Skipped;
        };
        if !self.connected.contains(node) {
            debug!(node, "statistics for untracked node dropped");
            return Ingest::Skipped;
        }

        let snapshot = match Snapshot::from_json(node, payload, &self.registry) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(node, error = %e, "malformed statistics");
                return Ingest::Skipped;
            }
        };

        if let Some(latest) = self.history.latest(node) {
            if snapshot.zeit <= latest.zeit {
                debug!(node, zeit = snapshot.zeit, latest = latest.zeit, "stale statistics dropped");
                return Ingest::Skipped;
            }
        }

        self.history.append(snapshot);

        if self.visible.as_deref() == Some(node) {
            match self.repaint(node) {
                Some(repaint) => Ingest::Repainted(repaint),
                None => Ingest::Recorded,
            }
        } else {
            Ingest::Recorded
        }
    }

    /// Store the descriptor shown in a node's info panel.
    pub fn on_details_received(&mut self, node: &str, details: Value) {
        if !self.connected.contains(node) {
            debug!(node, "details for untracked node dropped");
            return;
        }
        self.details.insert(node.to_string(), details);
    }

    /// Flip whether `key` is plotted for `node`.
    ///
    /// Returns the new membership, or `None` when the key is not plottable.
    pub fn on_plot_toggle(&mut self, node: &str, key: &StatKey) -> Option<bool> {
        if !self.registry.is_plottable(key) {
            debug!(node, %key, "toggle on non-plottable statistic ignored");
            return None;
        }

        let plotted = self.selection.toggle(node, key);
        self.renderer.set_plot_state(node, key, plotted);
        self.rebuild_chart(node);
        Some(plotted)
    }

    /// Make `node` the visible one, repainting it from its latest snapshot.
    pub fn set_visible(&mut self, node: Option<&str>) -> Option<Repaint> {
        self.visible = node.map(str::to_string);
        let node = node?;
        self.repaint(node)
    }

    fn repaint(&mut self, node: &str) -> Option<Repaint> {
        let snapshot = self.history.latest(node)?;
        let repaint =
            self.renderer
                .repaint(snapshot, &mut self.selection, &self.registry, &self.labels);
        self.rebuild_chart(node);
        Some(repaint)
    }

    fn rebuild_chart(&mut self, node: &str) {
        let spec = chart::assemble(
            node,
            &self.history,
            &self.selection,
            &self.registry,
            &self.labels,
        );
        self.charts.insert(node.to_string(), spec);
    }

    /// The chart of a node as of its last repaint or toggle.
    pub fn chart(&self, node: &str) -> Option<&ChartSpec> {
        self.charts.get(node)
    }

    pub fn table(&self, node: &str) -> Option<&StatsTable> {
        self.renderer.table(node)
    }

    pub fn details(&self, node: &str) -> Option<&Value> {
        self.details.get(node)
    }

    /// Connected nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.connected.iter().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.connected.len()
    }

    pub fn is_connected(&self, node: &str) -> bool {
        self.connected.contains(node)
    }

    pub fn visible(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &PlotSelection {
        &self.selection
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn registry(&self) -> &StatRegistry {
        &self.registry
    }
}

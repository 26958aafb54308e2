//! Stats table construction and incremental repaint.
//!
//! The first time a node's statistics are shown, the full row structure is
//! built from its latest snapshot. After that only the value text of existing
//! rows is refreshed, found through a per-node map from [`StatKey`] to the
//! row's handle. The structure is rebuilt only after [`StatsRenderer::reset`],
//! which happens when the node disconnects.

use std::collections::HashMap;

use super::format::DisplayValue;
use super::key::StatKey;
use super::registry::{Labels, StatRegistry};
use super::selection::PlotSelection;
use super::snapshot::{Entry, Snapshot, Stat};

/// Placeholder shown instead of a plot toggle for ineligible statistics.
pub const NO_PLOT: &str = "-";

/// Index of a row within a node's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(usize);

impl RowHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Plot affordance of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotControl {
    /// The statistic is not plot-eligible.
    Unavailable,
    /// A toggle, pressed while the statistic is plotted.
    Toggle { pressed: bool },
}

impl PlotControl {
    pub fn is_toggle(&self) -> bool {
        matches!(self, PlotControl::Toggle { .. })
    }
}

/// A statistic row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub key: StatKey,
    pub label: String,
    pub value: DisplayValue,
    /// Row belongs to a tab group and is drawn indented.
    pub nested: bool,
    pub plot: PlotControl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRow {
    /// Title row of a tab group.
    Heading(String),
    Stat(StatRow),
}

/// The rendered table of one node.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    rows: Vec<TableRow>,
    index: HashMap<StatKey, RowHandle>,
}

impl StatsTable {
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn handle(&self, key: &StatKey) -> Option<RowHandle> {
        self.index.get(key).copied()
    }

    pub fn stat(&self, key: &StatKey) -> Option<&StatRow> {
        match self.rows.get(self.handle(key)?.0)? {
            TableRow::Stat(row) => Some(row),
            TableRow::Heading(_) => None,
        }
    }

    /// The statistic row at a position, skipping headings.
    pub fn stat_at(&self, position: usize) -> Option<&StatRow> {
        match self.rows.get(position)? {
            TableRow::Stat(row) => Some(row),
            TableRow::Heading(_) => None,
        }
    }

    fn stat_mut(&mut self, key: &StatKey) -> Option<&mut StatRow> {
        let handle = self.handle(key)?;
        match self.rows.get_mut(handle.0)? {
            TableRow::Stat(row) => Some(row),
            TableRow::Heading(_) => None,
        }
    }

    fn push_stat(&mut self, row: StatRow) {
        let handle = RowHandle(self.rows.len());
        self.index.entry(row.key.clone()).or_insert(handle);
        self.rows.push(TableRow::Stat(row));
    }
}

/// What a repaint did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    /// The full row structure was built.
    Built { rows: usize },
    /// Existing rows were refreshed; `updated` values changed.
    Patched { updated: usize },
}

/// Render state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Uninitialized,
    Built,
}

/// Builds and patches the stats tables of all nodes.
#[derive(Debug, Clone, Default)]
pub struct StatsRenderer {
    tables: HashMap<String, StatsTable>,
}

impl StatsRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, node: &str) -> RenderState {
        if self.tables.contains_key(node) {
            RenderState::Built
        } else {
            RenderState::Uninitialized
        }
    }

    pub fn table(&self, node: &str) -> Option<&StatsTable> {
        self.tables.get(node)
    }

    /// Repaint a node's table from its latest snapshot.
    pub fn repaint(
        &mut self,
        snapshot: &Snapshot,
        selection: &mut PlotSelection,
        registry: &StatRegistry,
        labels: &Labels,
    ) -> Repaint {
        match self.tables.get_mut(&snapshot.node) {
            Some(table) => Repaint::Patched {
                updated: Self::patch(table, snapshot, registry),
            },
            None => {
                selection.ensure_defaults(&snapshot.node);
                let table = Self::build(snapshot, selection, registry, labels);
                let rows = table.len();
                self.tables.insert(snapshot.node.clone(), table);
                Repaint::Built { rows }
            }
        }
    }

    /// Forget a node's table so the next repaint rebuilds it.
    pub fn reset(&mut self, node: &str) {
        self.tables.remove(node);
    }

    /// Update a row's toggle state. Returns false if the row has no toggle.
    pub fn set_plot_state(&mut self, node: &str, key: &StatKey, pressed: bool) -> bool {
        let Some(row) = self.tables.get_mut(node).and_then(|t| t.stat_mut(key)) else {
            return false;
        };
        match row.plot {
            PlotControl::Toggle { .. } => {
                row.plot = PlotControl::Toggle { pressed };
                true
            }
            PlotControl::Unavailable => false,
        }
    }

    fn build(
        snapshot: &Snapshot,
        selection: &PlotSelection,
        registry: &StatRegistry,
        labels: &Labels,
    ) -> StatsTable {
        let mut table = StatsTable::default();
        let row = |stat: &Stat, nested: bool| StatRow {
            key: stat.key.clone(),
            label: labels.stat_label(&stat.key),
            value: registry.format(&stat.key, &stat.value),
            nested,
            plot: if registry.is_plottable(&stat.key) {
                PlotControl::Toggle {
                    pressed: selection.contains(&snapshot.node, &stat.key),
                }
            } else {
                PlotControl::Unavailable
            },
        };

        for entry in &snapshot.entries {
            match entry {
                Entry::Stat(stat) => table.push_stat(row(stat, false)),
                Entry::Group(group) => {
                    table
                        .rows
                        .push(TableRow::Heading(labels.group_title(&group.namespace, &group.title)));
                    for stat in &group.stats {
                        table.push_stat(row(stat, true));
                    }
                }
            }
        }

        table
    }

    fn patch(table: &mut StatsTable, snapshot: &Snapshot, registry: &StatRegistry) -> usize {
        let mut updated = 0;
        for stat in snapshot.stats() {
            let Some(row) = table.stat_mut(&stat.key) else {
                // Rows are only created on a full build.
                continue;
            };
            let value = registry.format(&stat.key, &stat.value);
            if row.value != value {
                row.value = value;
                updated += 1;
            }
        }
        updated
    }
}

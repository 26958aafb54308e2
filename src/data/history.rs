//! Rolling per-node history for plotting.

use std::collections::{HashMap, VecDeque};

use super::key::StatKey;
use super::snapshot::Snapshot;

/// Default number of snapshots kept per node.
pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// A plotted point: capture time (epoch ms) and value.
pub type Point = (i64, f64);

/// Bounded FIFO buffer of snapshots per node.
///
/// Appending past capacity evicts the oldest snapshots; there is no
/// time-based expiry.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    nodes: HashMap<String, VecDeque<Snapshot>>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl History {
    /// Create an empty history holding at most `capacity` snapshots per node.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            nodes: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a snapshot under its node.
    pub fn append(&mut self, snapshot: Snapshot) {
        let buffer = self.nodes.entry(snapshot.node.clone()).or_default();
        buffer.push_back(snapshot);
        while buffer.len() > self.capacity {
            buffer.pop_front();
        }
    }

    /// The most recent snapshot for a node, or `None` before any data.
    pub fn latest(&self, node: &str) -> Option<&Snapshot> {
        self.nodes.get(node)?.back()
    }

    pub fn len(&self, node: &str) -> usize {
        self.nodes.get(node).map_or(0, VecDeque::len)
    }

    pub fn snapshots(&self, node: &str) -> impl Iterator<Item = &Snapshot> {
        self.nodes.get(node).into_iter().flatten()
    }

    /// Time series of one statistic for a node.
    ///
    /// Snapshots that lack the key, or hold a non-numeric value for it,
    /// contribute no point.
    pub fn series_for(&self, node: &str, key: &StatKey) -> Vec<Point> {
        self.snapshots(node)
            .filter_map(|snapshot| snapshot.number(key).map(|value| (snapshot.zeit, value)))
            .collect()
    }

    /// Drop everything recorded for a node.
    pub fn forget(&mut self, node: &str) {
        self.nodes.remove(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::format::GroupType;
    use crate::data::registry::StatRegistry;
    use serde_json::{json, Value};

    fn registry() -> StatRegistry {
        StatRegistry::default().with_group("bhs", GroupType::Tab)
    }

    fn snap(node: &str, zeit: i64, payload: Value) -> Snapshot {
        let mut payload = payload;
        payload["zeit"] = json!(zeit);
        Snapshot::from_json(node, payload, &registry()).unwrap()
    }

    #[test]
    fn new_history_is_empty() {
        let h = History::new(10);
        assert!(h.latest("node1").is_none());
        assert_eq!(h.len("node1"), 0);
        assert!(h.series_for("node1", &StatKey::plain("x")).is_empty());
    }

    #[test]
    fn append_and_latest() {
        let mut h = History::new(10);
        h.append(snap("node1", 1, json!({"x": 1})));
        h.append(snap("node1", 2, json!({"x": 2})));

        assert_eq!(h.len("node1"), 2);
        assert_eq!(h.latest("node1").unwrap().zeit, 2);
    }

    #[test]
    fn history_caps_at_capacity_keeping_most_recent() {
        let mut h = History::new(20);

        for i in 0..35 {
            h.append(snap("node1", i, json!({"x": i})));
            assert!(h.len("node1") <= 20);
        }

        let zeits: Vec<i64> = h.snapshots("node1").map(|s| s.zeit).collect();
        assert_eq!(zeits, (15..35).collect::<Vec<_>>());
    }

    #[test]
    fn nodes_are_independent() {
        let mut h = History::new(2);
        h.append(snap("a", 1, json!({})));
        h.append(snap("b", 1, json!({})));
        h.append(snap("b", 2, json!({})));
        h.append(snap("b", 3, json!({})));

        assert_eq!(h.len("a"), 1);
        assert_eq!(h.len("b"), 2);
    }

    #[test]
    fn series_for_plain_key() {
        let mut h = History::new(10);
        h.append(snap("n", 10, json!({"x": 1})));
        h.append(snap("n", 20, json!({"x": 2.5})));

        assert_eq!(h.series_for("n", &StatKey::plain("x")), vec![(10, 1.0), (20, 2.5)]);
    }

    #[test]
    fn series_for_sparse_compound_key_has_no_fabricated_points() {
        let mut h = History::new(10);
        h.append(snap("n", 1, json!({"bhs!t": {"messages!b1": 4}})));
        h.append(snap("n", 2, json!({"other": 1})));
        h.append(snap("n", 3, json!({"bhs!t": {"uploads": 1}})));
        h.append(snap("n", 4, json!({"bhs!t": {"messages!b1": 9}})));

        let series = h.series_for("n", &StatKey::parse("bhs!messages!b1"));
        assert_eq!(series, vec![(1, 4.0), (4, 9.0)]);
        assert!(series.len() <= h.len("n"));
    }

    #[test]
    fn series_for_reads_the_keys_own_group() {
        let mut h = History::new(10);
        for (zeit, a, b) in [(1, 1, 100), (2, 2, 200)] {
            h.append(snap(
                "n",
                zeit,
                json!({"bhs!board-a": {"messages": a}, "bhs!board-b": {"messages": b}}),
            ));
        }

        let board_a = h.series_for("n", &StatKey::nested("bhs", "board-a", "messages"));
        let board_b = h.series_for("n", &StatKey::nested("bhs", "board-b", "messages"));
        assert_eq!(board_a, vec![(1, 1.0), (2, 2.0)]);
        assert_eq!(board_b, vec![(1, 100.0), (2, 200.0)]);
    }

    #[test]
    fn non_numeric_values_are_skipped() {
        let mut h = History::new(10);
        h.append(snap("n", 1, json!({"x": "n/a"})));
        h.append(snap("n", 2, json!({"x": 3})));

        assert_eq!(h.series_for("n", &StatKey::plain("x")), vec![(2, 3.0)]);
    }

    #[test]
    fn forget_drops_node() {
        let mut h = History::new(10);
        h.append(snap("n", 1, json!({"x": 1})));
        h.forget("n");
        assert!(h.latest("n").is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut h = History::new(0);
        h.append(snap("n", 1, json!({})));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.len("n"), 1);
    }
}

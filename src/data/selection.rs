//! Which statistics are plotted for each node.

use std::collections::{BTreeSet, HashMap};

use super::key::StatKey;

/// Per-node set of plotted statistics.
///
/// Each node starts from its own copy of the default series; toggling on one
/// node never affects another node or the defaults.
#[derive(Debug, Clone, Default)]
pub struct PlotSelection {
    defaults: Vec<StatKey>,
    nodes: HashMap<String, BTreeSet<StatKey>>,
}

impl PlotSelection {
    pub fn new(defaults: Vec<StatKey>) -> Self {
        Self {
            defaults,
            nodes: HashMap::new(),
        }
    }

    /// Initialise a node's selection from the defaults if it has none yet.
    ///
    /// Returns the node's current selection.
    pub fn ensure_defaults(&mut self, node: &str) -> &BTreeSet<StatKey> {
        self.nodes
            .entry(node.to_string())
            .or_insert_with(|| self.defaults.iter().cloned().collect())
    }

    /// Flip membership of `key` for `node`, returning the new membership.
    pub fn toggle(&mut self, node: &str, key: &StatKey) -> bool {
        let selected = self
            .nodes
            .entry(node.to_string())
            .or_insert_with(|| self.defaults.iter().cloned().collect());

        if selected.remove(key) {
            false
        } else {
            selected.insert(key.clone());
            true
        }
    }

    pub fn contains(&self, node: &str, key: &StatKey) -> bool {
        self.nodes.get(node).is_some_and(|keys| keys.contains(key))
    }

    /// Selected keys for a node, in key order. Empty before initialisation.
    pub fn selected(&self, node: &str) -> impl Iterator<Item = &StatKey> {
        self.nodes.get(node).into_iter().flatten()
    }

    pub fn is_initialized(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn defaults(&self) -> &[StatKey] {
        &self.defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> PlotSelection {
        PlotSelection::new(vec![StatKey::plain("vm.free-memory")])
    }

    #[test]
    fn defaults_are_copied_on_first_use() {
        let mut s = selection();
        assert!(!s.is_initialized("n1"));
        assert!(!s.contains("n1", &StatKey::plain("vm.free-memory")));

        s.ensure_defaults("n1");
        assert!(s.contains("n1", &StatKey::plain("vm.free-memory")));
    }

    #[test]
    fn ensure_defaults_keeps_existing_selection() {
        let mut s = selection();
        s.ensure_defaults("n1");
        s.toggle("n1", &StatKey::plain("vm.free-memory"));
        s.ensure_defaults("n1");
        assert!(!s.contains("n1", &StatKey::plain("vm.free-memory")));
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut s = selection();
        s.ensure_defaults("n1");
        let key = StatKey::plain("vm.gc.count.delta");

        assert!(s.toggle("n1", &key));
        assert!(s.contains("n1", &key));
        assert!(!s.toggle("n1", &key));
        assert!(!s.contains("n1", &key));

        let default_key = StatKey::plain("vm.free-memory");
        s.toggle("n1", &default_key);
        s.toggle("n1", &default_key);
        assert!(s.contains("n1", &default_key));
    }

    #[test]
    fn nodes_do_not_share_selection() {
        let mut s = selection();
        s.ensure_defaults("n1");
        s.ensure_defaults("n2");
        s.toggle("n1", &StatKey::plain("vm.free-memory"));

        assert!(!s.contains("n1", &StatKey::plain("vm.free-memory")));
        assert!(s.contains("n2", &StatKey::plain("vm.free-memory")));
        assert_eq!(s.defaults(), &[StatKey::plain("vm.free-memory")]);
    }

    #[test]
    fn toggle_on_uninitialized_node_starts_from_defaults() {
        let mut s = selection();
        assert!(s.toggle("n1", &StatKey::plain("x")));
        assert!(s.contains("n1", &StatKey::plain("vm.free-memory")));
    }
}

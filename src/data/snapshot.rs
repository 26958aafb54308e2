//! Per-node statistics snapshots.
//!
//! A node answers a statistics poll with a flat JSON object:
//!
//! ```json
//! {
//!   "name": "node1",
//!   "hash": 31337,
//!   "zeit": 1381000000000,
//!   "vm.free-memory": 1048576,
//!   "bhs!bhs-title": { "messages!ballots": 12, "uploads": 3 }
//! }
//! ```
//!
//! `name`, `hash` and `zeit` are reserved. A compound key whose namespace is
//! registered as a tab group and whose value is an object becomes a
//! [`StatGroup`]; everything else becomes a flat [`Stat`].

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use super::format::GroupType;
use super::key::StatKey;
use super::registry::StatRegistry;

/// Capture timestamp field (epoch milliseconds).
pub const ZEIT_FIELD: &str = "zeit";
/// Node name field.
pub const NAME_FIELD: &str = "name";
/// Node hash field.
pub const HASH_FIELD: &str = "hash";

const RESERVED_FIELDS: &[&str] = &[ZEIT_FIELD, NAME_FIELD, HASH_FIELD];

/// Returns true for fields that identify the snapshot rather than measure
/// something.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("statistics for node {node} are not a JSON object")]
    NotAnObject { node: String },
}

/// A single statistic value.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub key: StatKey,
    pub value: Value,
}

/// A tab group: a titled set of nested statistics sharing a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct StatGroup {
    pub namespace: String,
    /// Field part of the group's own key, used for the heading label.
    pub title: String,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Stat(Stat),
    Group(StatGroup),
}

/// One timestamped statistics reading from a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub node: String,
    /// Capture time, epoch milliseconds.
    pub zeit: i64,
    pub entries: Vec<Entry>,
}

impl Snapshot {
    /// Decode a statistics payload.
    ///
    /// Keys are decoded once here. A missing `zeit` is replaced by the time
    /// of ingestion.
    pub fn from_json(
        node: &str,
        payload: Value,
        registry: &StatRegistry,
    ) -> Result<Self, SnapshotError> {
        let Value::Object(fields) = payload else {
            return Err(SnapshotError::NotAnObject {
                node: node.to_string(),
            });
        };

        let zeit = fields
            .get(ZEIT_FIELD)
            .and_then(Value::as_i64)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        let entries = fields
            .into_iter()
            .filter(|(raw, _)| !is_reserved(raw))
            .map(|(raw, value)| Self::decode_entry(&raw, value, registry))
            .collect();

        Ok(Self {
            node: node.to_string(),
            zeit,
            entries,
        })
    }

    fn decode_entry(raw: &str, value: Value, registry: &StatRegistry) -> Entry {
        let key = StatKey::parse(raw);

        if let StatKey::Namespaced {
            namespace, field, ..
        } = &key
        {
            if registry.group_type(namespace) == GroupType::Tab {
                if let Value::Object(nested) = value {
                    return Entry::Group(Self::decode_group(namespace, field, nested));
                }
            }
        }

        Entry::Stat(Stat { key, value })
    }

    fn decode_group(namespace: &str, title: &str, nested: Map<String, Value>) -> StatGroup {
        let stats = nested
            .into_iter()
            .map(|(raw, value)| Stat {
                key: StatKey::nested(namespace, title, &raw),
                value,
            })
            .collect();

        StatGroup {
            namespace: namespace.to_string(),
            title: title.to_string(),
            stats,
        }
    }

    /// Look up a value by decoded key.
    ///
    /// Compound keys are searched inside groups of their namespace first and
    /// then among flat entries, so non-tab compound keys still resolve. A key
    /// that names its group only looks inside that group; one without a group
    /// resolves to the first group holding the field.
    pub fn get(&self, key: &StatKey) -> Option<&Value> {
        if let Some(namespace) = key.namespace() {
            let nested = self
                .groups()
                .filter(|group| group.namespace == namespace)
                .filter(|group| key.group().is_none_or(|title| group.title == title))
                .flat_map(|group| group.stats.iter())
                .find(|stat| stat.key.matches(key));
            if let Some(stat) = nested {
                return Some(&stat.value);
            }
        }

        self.entries.iter().find_map(|entry| match entry {
            Entry::Stat(stat) if &stat.key == key => Some(&stat.value),
            _ => None,
        })
    }

    /// Numeric value of a key, if present and numeric.
    pub fn number(&self, key: &StatKey) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn groups(&self) -> impl Iterator<Item = &StatGroup> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Group(group) => Some(group),
            Entry::Stat(_) => None,
        })
    }

    /// Every statistic, flat and nested, in table order.
    pub fn stats(&self) -> impl Iterator<Item = &Stat> {
        self.entries.iter().flat_map(|entry| match entry {
            Entry::Stat(stat) => std::slice::from_ref(stat).iter(),
            Entry::Group(group) => group.stats.iter(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> StatRegistry {
        StatRegistry::default().with_group("bhs", GroupType::Tab)
    }

    fn sample() -> Value {
        json!({
            "name": "node1",
            "hash": 99,
            "zeit": 1000,
            "vm.free-memory": 1048576,
            "vm!flat": 5,
            "bhs!bhs-title": { "messages!ballots": 12, "uploads": 3 }
        })
    }

    #[test]
    fn reserved_fields_are_not_entries() {
        let snapshot = Snapshot::from_json("node1", sample(), &registry()).unwrap();
        assert_eq!(snapshot.zeit, 1000);
        assert!(snapshot.stats().all(|s| !is_reserved(&s.key.to_string())));
    }

    #[test]
    fn tab_namespaces_become_groups() {
        let snapshot = Snapshot::from_json("node1", sample(), &registry()).unwrap();
        let groups: Vec<_> = snapshot.groups().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].namespace, "bhs");
        assert_eq!(groups[0].title, "bhs-title");
        assert_eq!(groups[0].stats.len(), 2);
    }

    #[test]
    fn non_tab_compound_keys_stay_flat() {
        let snapshot = Snapshot::from_json("node1", sample(), &registry()).unwrap();
        assert_eq!(snapshot.number(&StatKey::parse("vm!flat")), Some(5.0));
    }

    #[test]
    fn get_resolves_nested_keys() {
        let snapshot = Snapshot::from_json("node1", sample(), &registry()).unwrap();
        assert_eq!(snapshot.number(&StatKey::parse("bhs!messages!ballots")), Some(12.0));
        assert_eq!(snapshot.number(&StatKey::parse("bhs!uploads")), Some(3.0));
        assert_eq!(snapshot.number(&StatKey::parse("bhs!downloads")), None);
        assert_eq!(snapshot.number(&StatKey::plain("vm.free-memory")), Some(1048576.0));
    }

    #[test]
    fn groups_sharing_a_field_resolve_separately() {
        let payload = json!({
            "zeit": 1,
            "bhs!board-a": { "messages": 1 },
            "bhs!board-b": { "messages": 100 }
        });
        let snapshot = Snapshot::from_json("n", payload, &registry()).unwrap();
        assert_eq!(snapshot.groups().count(), 2);
        assert_eq!(
            snapshot.number(&StatKey::nested("bhs", "board-a", "messages")),
            Some(1.0)
        );
        assert_eq!(
            snapshot.number(&StatKey::nested("bhs", "board-b", "messages")),
            Some(100.0)
        );
        assert_eq!(snapshot.number(&StatKey::nested("bhs", "board-c", "messages")), None);
    }

    #[test]
    fn group_without_object_value_is_flat() {
        let payload = json!({"zeit": 1, "bhs!count": 4});
        let snapshot = Snapshot::from_json("n", payload, &registry()).unwrap();
        assert_eq!(snapshot.groups().count(), 0);
        assert_eq!(snapshot.number(&StatKey::parse("bhs!count")), Some(4.0));
    }

    #[test]
    fn missing_zeit_uses_ingestion_time() {
        let before = Utc::now().timestamp_millis();
        let snapshot = Snapshot::from_json("n", json!({"a": 1}), &registry()).unwrap();
        assert!(snapshot.zeit >= before);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = Snapshot::from_json("n", json!([1, 2]), &registry()).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }
}

//! Statistic key codec.
//!
//! Statistics arrive keyed by strings. Most keys are plain (`vm.free-memory`),
//! but values nested inside a named sub-group use a compound form:
//!
//! ```text
//! namespace!field          e.g. bhs!messages
//! namespace!field!suffix   e.g. bhs!messages!board-1
//! ```
//!
//! Keys are decoded once into a [`StatKey`] when a snapshot is ingested, so
//! nothing downstream searches strings for the delimiter again.
//!
//! Keys found inside a tab group also remember the group they came from
//! (the field of the group's own key). Two groups of one namespace may hold
//! the same nested field, and each of those is a distinct statistic.

use std::fmt;

/// Separator between namespace, field and suffix in a compound key.
pub const DELIMITER: char = '!';

/// Returns true if the raw key uses the compound form.
pub fn is_compound(key: &str) -> bool {
    key.contains(DELIMITER)
}

/// Split a raw key on the delimiter.
///
/// No validation happens here: empty parts and unexpected part counts are
/// passed through to the caller.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split(DELIMITER).collect()
}

/// A decoded statistic identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatKey {
    /// A top-level statistic.
    Plain(String),
    /// A statistic nested inside a named group.
    Namespaced {
        namespace: String,
        field: String,
        suffix: Option<String>,
        /// Field of the enclosing tab group, for keys decoded from a group.
        group: Option<String>,
    },
}

impl StatKey {
    /// Decode a raw wire key.
    ///
    /// Anything after the third part is folded back into the suffix so that
    /// the key still re-encodes to the original string.
    pub fn parse(raw: &str) -> Self {
        if !is_compound(raw) {
            return StatKey::Plain(raw.to_string());
        }

        let mut parts = raw.splitn(3, DELIMITER);
        let namespace = parts.next().unwrap_or_default().to_string();
        let field = parts.next().unwrap_or_default().to_string();
        let suffix = parts.next().map(str::to_string);

        StatKey::Namespaced {
            namespace,
            field,
            suffix,
            group: None,
        }
    }

    /// Decode a key found inside the mapping of a group.
    ///
    /// Nested keys are written as `field` or `field!suffix`; the namespace
    /// and group come from the group key that holds them (`namespace!group`).
    pub fn nested(namespace: &str, group: &str, raw: &str) -> Self {
        let (field, suffix) = match raw.split_once(DELIMITER) {
            Some((field, suffix)) => (field.to_string(), Some(suffix.to_string())),
            None => (raw.to_string(), None),
        };

        StatKey::Namespaced {
            namespace: namespace.to_string(),
            field,
            suffix,
            group: Some(group.to_string()),
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        StatKey::Plain(name.into())
    }

    /// The namespace of a compound key.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            StatKey::Plain(_) => None,
            StatKey::Namespaced { namespace, .. } => Some(namespace),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, StatKey::Namespaced { .. })
    }

    /// The tab group a nested key was decoded from.
    pub fn group(&self) -> Option<&str> {
        match self {
            StatKey::Namespaced {
                group: Some(group), ..
            } => Some(group),
            _ => None,
        }
    }

    /// True if `self` names the same statistic as `query`.
    ///
    /// A query without a group matches a nested key of any group, so wire
    /// keys such as `bhs!messages` still resolve inside tab groups.
    pub fn matches(&self, query: &StatKey) -> bool {
        match (self, query) {
            (
                StatKey::Namespaced {
                    namespace,
                    field,
                    suffix,
                    ..
                },
                StatKey::Namespaced {
                    namespace: q_namespace,
                    field: q_field,
                    suffix: q_suffix,
                    group: None,
                },
            ) => namespace == q_namespace && field == q_field && suffix == q_suffix,
            _ => self == query,
        }
    }

    /// The key without its suffix.
    ///
    /// Registries (types, plot eligibility) are keyed by this form, so every
    /// instance of `bhs!messages!<board>` shares the settings of
    /// `bhs!messages`.
    pub fn type_name(&self) -> String {
        match self {
            StatKey::Plain(name) => name.clone(),
            StatKey::Namespaced {
                namespace, field, ..
            } => format!("{namespace}{DELIMITER}{field}"),
        }
    }

    /// The key as it appears inside a group's mapping (`field[!suffix]`).
    pub fn nested_name(&self) -> String {
        match self {
            StatKey::Plain(name) => name.clone(),
            StatKey::Namespaced {
                field,
                suffix: Some(suffix),
                ..
            } => format!("{field}{DELIMITER}{suffix}"),
            StatKey::Namespaced { field, .. } => field.clone(),
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatKey::Plain(name) => f.write_str(name),
            StatKey::Namespaced {
                namespace,
                field,
                suffix: None,
                ..
            } => write!(f, "{namespace}{DELIMITER}{field}"),
            StatKey::Namespaced {
                namespace,
                field,
                suffix: Some(suffix),
                ..
            } => write!(f, "{namespace}{DELIMITER}{field}{DELIMITER}{suffix}"),
        }
    }
}

impl From<&str> for StatKey {
    fn from(raw: &str) -> Self {
        StatKey::parse(raw)
    }
}

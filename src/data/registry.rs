//! Language pack, label lookup and the statistic type registry.
//!
//! A language pack carries both the localized labels and the per-key display
//! configuration (types, tab groups, which keys may be plotted and which are
//! plotted by default). It is loaded once at startup and split into
//! [`Labels`] and [`StatRegistry`], which are then passed by reference to the
//! components that need them.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::format::{DisplayValue, GroupType, StatType, TickFormatter};
use super::key::StatKey;

/// English pack compiled into the binary.
const BUILTIN_PACK: &str = include_str!("../../lang/en_us.json");

/// Failure to load a language pack. This is the one error that is shown to
/// the operator.
#[derive(Debug, Error)]
pub enum LanguagePackError {
    #[error("failed to read language pack {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse language pack {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("built-in language pack is malformed: {0}")]
    Builtin(#[source] serde_json::Error),
}

/// The on-disk language pack format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguagePack {
    pub name: String,
    /// Flat labels keyed by statistic or section name.
    pub labels: HashMap<String, String>,
    /// Labels for compound keys: namespace -> field -> label.
    pub nested: HashMap<String, HashMap<String, String>>,
    pub types: HashMap<String, StatType>,
    pub groups: HashMap<String, GroupType>,
    /// Keys (without suffix) that may be plotted.
    pub plottable: Vec<String>,
    /// Keys plotted when a node is first shown.
    pub default_plot: Vec<String>,
}

impl LanguagePack {
    /// The built-in English pack.
    pub fn builtin() -> Result<Self, LanguagePackError> {
        serde_json::from_str(BUILTIN_PACK).map_err(LanguagePackError::Builtin)
    }

    /// Load a pack from a JSON file.
    pub fn load(path: &Path) -> Result<Self, LanguagePackError> {
        let content = fs::read_to_string(path).map_err(|source| LanguagePackError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LanguagePackError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Split the pack into its label and registry halves.
    pub fn into_parts(self) -> (Labels, StatRegistry) {
        let labels = Labels {
            flat: self.labels,
            nested: self.nested,
        };
        let registry = StatRegistry {
            types: self.types,
            groups: self.groups,
            plottable: self.plottable.into_iter().collect(),
            default_plot: self.default_plot.iter().map(|k| StatKey::parse(k)).collect(),
        };
        (labels, registry)
    }
}

/// Localized label lookup. Missing labels fall back to the raw key.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    flat: HashMap<String, String>,
    nested: HashMap<String, HashMap<String, String>>,
}

impl Labels {
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.flat.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn nested_label<'a>(&'a self, namespace: &str, field: &'a str) -> &'a str {
        self.nested
            .get(namespace)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// Label for any decoded key. A suffix is shown in brackets after the
    /// field label so per-instance rows stay distinguishable.
    pub fn stat_label(&self, key: &StatKey) -> String {
        match key {
            StatKey::Plain(name) => self.label(name).to_string(),
            StatKey::Namespaced {
                namespace,
                field,
                suffix,
                ..
            } => {
                let label = self.nested_label(namespace, field);
                match suffix {
                    Some(suffix) => format!("{label} ({suffix})"),
                    None => label.to_string(),
                }
            }
        }
    }

    /// Label for a chart series. Keys from a tab group are prefixed with the
    /// group's title, since the group heading is not on screen.
    pub fn series_label(&self, key: &StatKey) -> String {
        match (key.namespace(), key.group()) {
            (Some(namespace), Some(group)) => {
                format!("{}: {}", self.group_title(namespace, group), self.stat_label(key))
            }
            _ => self.stat_label(key),
        }
    }

    /// Heading for a tab group.
    pub fn group_title(&self, namespace: &str, field: &str) -> String {
        if let Some(title) = self.nested.get(namespace).and_then(|f| f.get(field)) {
            return title.clone();
        }
        self.label(namespace).to_string()
    }
}

/// Per-key display configuration.
#[derive(Debug, Clone, Default)]
pub struct StatRegistry {
    types: HashMap<String, StatType>,
    groups: HashMap<String, GroupType>,
    plottable: HashSet<String>,
    default_plot: Vec<StatKey>,
}

impl StatRegistry {
    pub fn classify(&self, key: &StatKey) -> StatType {
        self.types.get(&key.type_name()).copied().unwrap_or_default()
    }

    pub fn format(&self, key: &StatKey, value: &Value) -> DisplayValue {
        self.classify(key).format(value)
    }

    pub fn chart_formatter(&self, key: &StatKey) -> Option<TickFormatter> {
        self.classify(key).tick_formatter()
    }

    pub fn group_type(&self, namespace: &str) -> GroupType {
        self.groups.get(namespace).copied().unwrap_or_default()
    }

    pub fn is_plottable(&self, key: &StatKey) -> bool {
        self.plottable.contains(&key.type_name())
    }

    pub fn default_series(&self) -> &[StatKey] {
        &self.default_plot
    }

    pub fn with_type(mut self, key: &str, stat_type: StatType) -> Self {
        self.types.insert(key.to_string(), stat_type);
        self
    }

    pub fn with_group(mut self, namespace: &str, group: GroupType) -> Self {
        self.groups.insert(namespace.to_string(), group);
        self
    }

    pub fn with_plottable(mut self, key: &str) -> Self {
        self.plottable.insert(key.to_string());
        self
    }

    pub fn with_default_plot(mut self, key: &str) -> Self {
        self.default_plot.push(StatKey::parse(key));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_pack_parses() {
        let pack = LanguagePack::builtin().unwrap();
        assert_eq!(pack.name, "English (US)");
        assert_eq!(pack.types.get("vm.up-time"), Some(&StatType::DurationMs));
        assert_eq!(pack.groups.get("bhs"), Some(&GroupType::Tab));
        assert!(!pack.default_plot.is_empty());
    }

    #[test]
    fn unregistered_keys_are_plain() {
        let (_, registry) = LanguagePack::builtin().unwrap().into_parts();
        assert_eq!(registry.classify(&StatKey::plain("unknown")), StatType::Plain);
        assert_eq!(
            registry.format(&StatKey::plain("unknown"), &json!(7)),
            DisplayValue::Text("7".into())
        );
    }

    #[test]
    fn suffix_is_ignored_for_registry_lookups() {
        let registry = StatRegistry::default()
            .with_type("bhs!bytes", StatType::Bytes)
            .with_plottable("bhs!bytes");
        let key = StatKey::parse("bhs!bytes!board-1");
        assert_eq!(registry.classify(&key), StatType::Bytes);
        assert!(registry.is_plottable(&key));
        assert_eq!(registry.chart_formatter(&key), Some(TickFormatter::Megabytes));
    }

    #[test]
    fn labels_fall_back_to_raw_key() {
        let (labels, _) = LanguagePack::builtin().unwrap().into_parts();
        assert_eq!(labels.label("vm.free-memory"), "Free Memory");
        assert_eq!(labels.label("no.such.key"), "no.such.key");
        assert_eq!(labels.nested_label("bhs", "messages"), "Messages");
        assert_eq!(labels.nested_label("bhs", "mystery"), "mystery");
    }

    #[test]
    fn stat_label_appends_suffix() {
        let (labels, _) = LanguagePack::builtin().unwrap().into_parts();
        assert_eq!(
            labels.stat_label(&StatKey::parse("bhs!messages!ballots")),
            "Messages (ballots)"
        );
        assert_eq!(labels.stat_label(&StatKey::plain("vm.up-time")), "Up-Time");
    }

    #[test]
    fn series_label_names_the_group() {
        let (labels, _) = LanguagePack::builtin().unwrap().into_parts();
        assert_eq!(
            labels.series_label(&StatKey::nested("bhs", "bhs-title", "messages")),
            "Board Hosting Service: Messages"
        );
        assert_eq!(labels.series_label(&StatKey::parse("bhs!messages")), "Messages");
    }

    #[test]
    fn group_title_prefers_nested_label() {
        let (labels, _) = LanguagePack::builtin().unwrap().into_parts();
        assert_eq!(labels.group_title("bhs", "bhs-title"), "Board Hosting Service");
        assert_eq!(labels.group_title("other", "x"), "other");
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"name": "Test", "labels": {{"a": "Alpha"}}, "types": {{"a": "mb"}}}}"#
        )
        .unwrap();

        let pack = LanguagePack::load(file.path()).unwrap();
        assert_eq!(pack.name, "Test");
        let (labels, registry) = pack.into_parts();
        assert_eq!(labels.label("a"), "Alpha");
        assert_eq!(registry.classify(&StatKey::plain("a")), StatType::Bytes);
    }

    #[test]
    fn load_failures_are_reported() {
        let err = LanguagePack::load(Path::new("/nonexistent/pack.json")).unwrap_err();
        assert!(matches!(err, LanguagePackError::Read { .. }));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "lang['x'] = 'not json';").unwrap();
        let err = LanguagePack::load(file.path()).unwrap_err();
        assert!(matches!(err, LanguagePackError::Parse { .. }));
    }
}

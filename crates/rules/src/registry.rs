use crate::error::{Result, RuleError};
use contract_protocol::{read_json_table, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub const REGISTRY_SCHEMA_VERSION: u32 = 1;

/// Lifecycle status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Free to use
    Canonical,
    /// Tolerated for now; an error under `--strict`
    Compat,
    Legacy,
    Forbidden,
}

impl ComponentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentStatus::Canonical => "canonical",
            ComponentStatus::Compat => "compat",
            ComponentStatus::Legacy => "legacy",
            ComponentStatus::Forbidden => "forbidden",
        }
    }

    pub fn is_disallowed(self) -> bool {
        matches!(self, ComponentStatus::Legacy | ComponentStatus::Forbidden)
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryEntry {
    pub name: String,
    pub status: ComponentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryTable {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    components: Vec<RegistryEntry>,
}

fn default_schema_version() -> u32 {
    REGISTRY_SCHEMA_VERSION
}

/// Component name -> entry. Built once per run and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn load(path: &Path) -> Result<Self> {
        let table: RegistryTable = read_json_table(path)?;
        if table.schema_version != REGISTRY_SCHEMA_VERSION {
            return Err(ConfigError::invalid(format!(
                "{}: registry schema_version {} is not supported",
                path.display(),
                table.schema_version
            ))
            .into());
        }
        let registry = Self::from_entries(table.components)?;
        log::info!(
            "Loaded {} registry entries from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn from_entries(components: Vec<RegistryEntry>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for entry in components {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::invalid("registry entry with an empty name").into());
            }
            if entries.contains_key(&name) {
                return Err(RuleError::DuplicateComponent(name));
            }
            entries.insert(name, entry);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entry(name: &str, status: ComponentStatus) -> RegistryEntry {
        RegistryEntry {
            name: name.to_string(),
            status,
            replacement: None,
            note: None,
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = Registry::from_entries(vec![
            entry("Card", ComponentStatus::Canonical),
            entry("Card", ComponentStatus::Legacy),
        ])
        .unwrap_err();
        assert!(matches!(err, RuleError::DuplicateComponent(ref name) if name == "Card"));
    }

    #[test]
    fn test_load_accepts_every_status() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.json");
        fs::write(
            &path,
            r#"{
              "schema_version": 1,
              "components": [
                {"name": "Baz", "status": "canonical"},
                {"name": "Shim", "status": "compat", "replacement": "Baz"},
                {"name": "Bar", "status": "legacy", "replacement": "Baz"},
                {"name": "Old", "status": "forbidden", "note": "Removed in the redesign"}
              ]
            }"#,
        )
        .unwrap();

        let registry = Registry::load(&path).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("Shim").unwrap().status, ComponentStatus::Compat);
        assert!(registry.get("Old").unwrap().status.is_disallowed());
        assert_eq!(registry.get("Old").unwrap().replacement, None);
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_unknown_status_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.json");
        fs::write(
            &path,
            r#"{"components": [{"name": "Bar", "status": "deprecated"}]}"#,
        )
        .unwrap();

        let err = Registry::load(&path).unwrap_err();
        assert!(matches!(err, RuleError::Config(ConfigError::Parse { .. })));
    }
}

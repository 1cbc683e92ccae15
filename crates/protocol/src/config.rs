use crate::Level;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_FILE: &str = "contract.toml";
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Root of `contract.toml`. All paths are relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Only files under this directory are followed by the reachability walk.
    pub source_root: String,

    /// Shipped entry points, in the order they are seeded.
    pub entries: Vec<String>,

    /// Probe order when a specifier has no extension.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Specifier prefix -> directory. `"@/" = "src/"`.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,

    #[serde(default)]
    pub registry: Option<RegistryConfig>,

    #[serde(default)]
    pub patterns: Option<PatternsConfig>,

    #[serde(default)]
    pub banned_imports: Vec<BannedImportRule>,

    #[serde(default)]
    pub shell: Option<ShellConfig>,

    #[serde(default)]
    pub budgets: Vec<BudgetRule>,

    #[serde(default)]
    pub cross_ref: Option<CrossRefConfig>,
}

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// JSON table of component lifecycle entries.
    pub table: String,
    /// Imports resolving under this directory are registry-checked.
    pub component_root: String,
    /// Globs for non-component modules that live inside `component_root`.
    #[serde(default)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatternsConfig {
    /// Globs selecting which reachable files are scanned.
    pub scan: Vec<String>,
    #[serde(default)]
    pub rules: Vec<PatternRule>,
    /// Rule id -> globs of files exempt from that rule only.
    #[serde(default)]
    pub exceptions: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatternRule {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub level: Level,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportMatch {
    #[default]
    Exact,
    Prefix,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BannedImportRule {
    pub id: String,
    pub specifier: String,
    #[serde(default, rename = "match")]
    pub match_kind: ImportMatch,
    #[serde(default)]
    pub hint: String,
}

impl BannedImportRule {
    /// Literal comparison against the specifier exactly as written in source.
    pub fn matches(&self, specifier: &str) -> bool {
        match self.match_kind {
            ImportMatch::Exact => specifier == self.specifier,
            ImportMatch::Prefix => specifier.starts_with(&self.specifier),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    pub routes_dir: String,
    pub wrappers: Vec<String>,
    #[serde(default)]
    pub exempt: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetMetric {
    Bytes,
    Occurrences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BudgetRule {
    pub id: String,
    pub metric: BudgetMetric,
    pub files: Vec<String>,
    pub max: u64,
    /// Sum the metric over every matched file instead of measuring each one.
    #[serde(default)]
    pub aggregate: bool,
    /// Literal counted by the `occurrences` metric.
    #[serde(default)]
    pub literal: Option<String>,
    #[serde(default)]
    pub hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CrossRefConfig {
    pub blueprints: String,
    pub shared_data: String,
}

impl GateConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|err| match err {
            ConfigError::Invalid(message) => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GateConfig =
            toml::from_str(raw).map_err(|err| ConfigError::invalid(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != CONFIG_SCHEMA_VERSION {
            return Err(ConfigError::invalid(format!(
                "schema_version {} is not supported (expected {CONFIG_SCHEMA_VERSION})",
                self.schema_version
            )));
        }
        if self.source_root.trim().is_empty() {
            return Err(ConfigError::invalid("source_root must not be empty"));
        }
        if self.entries.is_empty() {
            return Err(ConfigError::invalid("entries must list at least one file"));
        }
        if let Some(ext) = self.extensions.iter().find(|ext| !ext.starts_with('.')) {
            return Err(ConfigError::invalid(format!(
                "extension '{ext}' must start with '.'"
            )));
        }
        if self.aliases.keys().any(|prefix| prefix.is_empty()) {
            return Err(ConfigError::invalid("alias prefixes must not be empty"));
        }
        if let Some(shell) = &self.shell {
            if shell.wrappers.is_empty() {
                return Err(ConfigError::invalid(
                    "shell.wrappers must name at least one layout wrapper",
                ));
            }
            if shell.wrappers.iter().any(|wrapper| wrapper.trim().is_empty()) {
                return Err(ConfigError::invalid("shell.wrappers must not contain blank names"));
            }
        }
        Ok(())
    }
}

/// Reads one declarative JSON table. Callers turn the error into a violation
/// of the check that needed the table.
pub fn read_json_table<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
source_root = "src"
entries = ["src/main.tsx"]
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = GateConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.schema_version, 1);
        assert_eq!(config.extensions, vec![".ts", ".tsx", ".js", ".jsx"]);
        assert!(config.registry.is_none());
        assert!(config.budgets.is_empty());
    }

    #[test]
    fn full_config_round_trips_sections() {
        let raw = r#"
source_root = "src"
entries = ["src/main.tsx", "src/App.tsx"]

[aliases]
"@/" = "src/"

[registry]
table = "contracts/registry.json"
component_root = "src/components"

[patterns]
scan = ["src/**"]

[[patterns.rules]]
id = "inline-style"
pattern = 'style=\{\{'
level = "warning"

[patterns.exceptions]
"inline-style" = ["src/components/motion/**"]

[[banned_imports]]
id = "no-legacy"
specifier = "@/legacy"
match = "prefix"

[shell]
routes_dir = "src/pages"
wrappers = ["PageShell"]

[[budgets]]
id = "css"
metric = "bytes"
files = ["dist/*.css"]
max = 10

[cross_ref]
blueprints = "b.json"
shared_data = "s.json"
"#;
        let config = GateConfig::from_toml_str(raw).unwrap();
        let patterns = config.patterns.unwrap();
        assert_eq!(patterns.rules[0].level, Level::Warning);
        assert_eq!(patterns.exceptions["inline-style"].len(), 1);
        assert_eq!(config.banned_imports[0].match_kind, ImportMatch::Prefix);
        assert_eq!(config.budgets[0].metric, BudgetMetric::Bytes);
        assert_eq!(config.aliases["@/"], "src/");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = format!("{MINIMAL}\nsurprise = true\n");
        let err = GateConfig::from_toml_str(&raw).unwrap_err();
        assert!(err.to_string().contains("surprise"), "{err}");
    }

    #[test]
    fn empty_entries_are_rejected() {
        let raw = "source_root = \"src\"\nentries = []\n";
        assert!(GateConfig::from_toml_str(raw).is_err());
    }

    #[test]
    fn blank_shell_wrappers_are_rejected() {
        let raw = format!(
            r#"{MINIMAL}
[shell]
routes_dir = "src/pages"
wrappers = ["PageShell", " "]
"#
        );
        let err = GateConfig::from_toml_str(&raw).unwrap_err();
        assert!(err.to_string().contains("blank"), "{err}");
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let raw = format!("schema_version = 2\n{MINIMAL}");
        let err = GateConfig::from_toml_str(&raw).unwrap_err();
        assert!(err.to_string().contains("schema_version 2"), "{err}");
    }

    #[test]
    fn banned_import_matching_is_literal() {
        let exact = BannedImportRule {
            id: "a".into(),
            specifier: "moment".into(),
            match_kind: ImportMatch::Exact,
            hint: String::new(),
        };
        assert!(exact.matches("moment"));
        assert!(!exact.matches("moment/locale/de"));

        let prefix = BannedImportRule {
            match_kind: ImportMatch::Prefix,
            ..exact
        };
        assert!(prefix.matches("moment/locale/de"));
    }

    #[test]
    fn missing_table_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = read_json_table::<serde_json::Value>(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"), "{err}");
    }
}

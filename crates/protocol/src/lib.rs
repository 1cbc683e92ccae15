use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod path_filters;

pub use path_filters::{relative_display, PathGlobs};
pub use config::{
    BannedImportRule, BudgetMetric, BudgetRule, ConfigError, CrossRefConfig, GateConfig,
    ImportMatch, PatternRule, PatternsConfig, RegistryConfig, ShellConfig, read_json_table,
    CONFIG_SCHEMA_VERSION, DEFAULT_CONFIG_FILE, DEFAULT_EXTENSIONS,
};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Severity of a single violation. Only `Error` fails the gate.
#[derive(
    Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Error,
    Warning,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Independent checks the gate knows how to run.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CheckId {
    Parse,
    Registry,
    Patterns,
    Imports,
    Shell,
    Budgets,
    CrossRef,
}

impl CheckId {
    pub const ALL: [CheckId; 7] = [
        CheckId::Parse,
        CheckId::Registry,
        CheckId::Patterns,
        CheckId::Imports,
        CheckId::Shell,
        CheckId::Budgets,
        CheckId::CrossRef,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckId::Parse => "parse",
            CheckId::Registry => "registry",
            CheckId::Patterns => "patterns",
            CheckId::Imports => "imports",
            CheckId::Shell => "shell",
            CheckId::Budgets => "budgets",
            CheckId::CrossRef => "cross-ref",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        CheckId::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = CheckId::ALL.iter().map(|id| id.as_str()).collect();
                format!("unknown check '{s}' (known: {})", known.join(", "))
            })
    }
}

/// One rule failure. Subjects are root-relative paths, route ids or data keys.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: CheckId,
    pub subject: String,
    pub level: Level,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Violation {
    pub fn new(
        rule: CheckId,
        level: Level,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            subject: subject.into(),
            level,
            message: message.into(),
            hint: None,
            line: None,
        }
    }

    pub fn error(rule: CheckId, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Level::Error, subject, message)
    }

    pub fn warning(rule: CheckId, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule, Level::Warning, subject, message)
    }

    /// A required input of one check could not be loaded; other checks still run.
    pub fn config_error(
        rule: CheckId,
        subject: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::error(rule, subject, format!("configuration error: {message}"))
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        if !hint.trim().is_empty() {
            self.hint = Some(hint);
        }
        self
    }

    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        a.rule
            .cmp(&b.rule)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.message.cmp(&b.message))
    });
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub check: CheckId,
    pub errors: usize,
    pub warnings: usize,
    /// Set when the check had no configuration section and did not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityStats {
    pub entries: usize,
    pub reachable_files: usize,
    pub followed_edges: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Report {
    pub schema_version: u32,
    pub strict: bool,
    pub reachability: ReachabilityStats,
    pub checks: Vec<CheckSummary>,
    pub violations: Vec<Violation>,
}

impl Report {
    pub fn new(
        strict: bool,
        reachability: ReachabilityStats,
        checks: Vec<CheckSummary>,
        mut violations: Vec<Violation>,
    ) -> Self {
        sort_violations(&mut violations);
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            strict,
            reachability,
            checks,
            violations,
        }
    }

    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(Violation::is_error)
    }

    /// The CI gate contract: zero iff no error-level violation exists.
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            1
        } else {
            0
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

use crate::error::RuleError;
use crate::registry::Registry;
use contract_graph::{ReachableSet, SourceFile};
use contract_imports::normalize_path;
use contract_protocol::{relative_display, GateConfig};
use std::path::{Path, PathBuf};

/// Everything a checker may read. Shared immutably by all checks of one run.
pub struct CheckContext<'a> {
    pub root: &'a Path,
    pub config: &'a GateConfig,
    pub reachable: &'a ReachableSet,
    /// `None` when `contract.toml` has no `[registry]` section
    pub registry: Option<&'a Result<Registry, RuleError>>,
    pub strict: bool,
}

impl<'a> CheckContext<'a> {
    pub fn files(&self) -> impl Iterator<Item = &'a SourceFile> {
        self.reachable.files()
    }

    pub fn rel(&self, path: &Path) -> String {
        relative_display(self.root, path)
    }

    /// Config paths are project-root relative
    pub fn resolve(&self, rel: &str) -> PathBuf {
        normalize_path(&self.root.join(rel.trim_start_matches("./")))
    }
}

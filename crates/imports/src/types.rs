use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of resolving one specifier from one importing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An existing regular file on disk
    Local(PathBuf),

    /// Looked local (alias or relative) but no candidate exists
    Unresolved(PathBuf),

    /// A package specifier; never part of the graph
    External,
}

impl Resolution {
    /// The on-disk file, if resolution found one
    pub fn into_local(self) -> Option<PathBuf> {
        match self {
            Resolution::Local(path) => Some(path),
            Resolution::Unresolved(_) | Resolution::External => None,
        }
    }
}

/// Syntactic origin of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import x from '...'`
    Static,

    /// `import '...'`
    SideEffect,

    /// `export { x } from '...'`, `export * from '...'`
    ReExport,

    /// `import('...')` with a literal argument
    Dynamic,
}

/// One binding introduced by an import declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportBinding {
    /// `import Card from './Card'`; `name` is the module's base name
    Default { local: String, name: String },

    /// `import { Foo as Bar }`; `imported` is `Foo`
    Named { imported: String, local: String },

    /// `import * as Ui from './ui'`
    Namespace { local: String },
}

impl ImportBinding {
    /// Name a registry lookup should use for this binding, if it has one of its own
    pub fn component_name(&self) -> Option<&str> {
        match self {
            ImportBinding::Default { name, .. } => Some(name),
            ImportBinding::Named { imported, .. } => Some(imported),
            ImportBinding::Namespace { .. } => None,
        }
    }
}

/// Import edge extracted from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    /// Importing file
    pub from: PathBuf,

    /// Specifier exactly as written
    pub specifier: String,

    /// Resolved on-disk file, when the specifier resolved locally
    pub resolved: Option<PathBuf>,

    /// Bindings, type-only specifiers already removed
    pub bindings: Vec<ImportBinding>,

    /// Whole declaration is type-only; never followed
    pub type_only: bool,

    pub kind: ImportKind,

    /// Line of the declaration (1-indexed)
    pub line: usize,
}

impl ImportEdge {
    /// Whether the reachability walk may follow this edge
    pub fn is_followable(&self) -> bool {
        !self.type_only && self.resolved.is_some()
    }
}

/// Base name a default import of `path` stands for; `index` files use their directory
pub fn module_base_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = stem.split('.').next().unwrap_or(stem);
    if stem == "index" {
        return path
            .parent()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string);
    }
    Some(stem.to_string())
}

/// Whether `path` is an `index.*` aggregator module
pub fn is_barrel(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == "index")
}

use crate::error::{GraphError, Result};
use crate::types::{ImportGraph, ReachableSet, SourceFile};
use contract_imports::{normalize_path, ImportExtractor};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Computes the reachable file set from a fixed list of entries
pub struct GraphBuilder {
    extractor: ImportExtractor,
    project_root: PathBuf,
    source_root: PathBuf,
}

impl GraphBuilder {
    /// `source_root` is relative to the resolver's project root; edges leaving it are not followed.
    pub fn new(extractor: ImportExtractor, source_root: &str) -> Self {
        let project_root = extractor.resolver().root().to_path_buf();
        let source_root = normalize_path(&project_root.join(source_root.trim_start_matches("./")));
        Self {
            extractor,
            project_root,
            source_root,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Worklist traversal from the entries. Every entry must exist on disk.
    pub fn build<S: AsRef<str>>(&mut self, entries: &[S]) -> Result<ReachableSet> {
        if entries.is_empty() {
            return Err(GraphError::NoEntries);
        }

        let mut entry_paths = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = normalize_path(&self.project_root.join(entry.as_ref()));
            if !path.is_file() {
                return Err(GraphError::MissingEntry(path));
            }
            entry_paths.push(path);
        }

        let mut files: BTreeMap<PathBuf, SourceFile> = BTreeMap::new();
        let mut graph = ImportGraph::new();
        let mut queue: Vec<PathBuf> = entry_paths.iter().rev().cloned().collect();

        while let Some(path) = queue.pop() {
            if files.contains_key(&path) {
                continue;
            }

            let file = SourceFile::load(&self.project_root, path.clone());
            let from = graph.add_file(&path);

            match file.imports(&mut self.extractor) {
                Ok(edges) => {
                    for edge in edges {
                        if !edge.is_followable() {
                            continue;
                        }
                        let Some(target) = edge.resolved.as_ref() else {
                            continue;
                        };
                        if !target.starts_with(&self.source_root) {
                            log::debug!(
                                "not following {} -> {} (outside source root)",
                                file.rel_path(),
                                target.display()
                            );
                            continue;
                        }
                        graph.add_edge(from, target, edge.kind);
                        if !files.contains_key(target) {
                            queue.push(target.clone());
                        }
                    }
                }
                Err(failure) => {
                    log::warn!("{}: {}", file.rel_path(), failure.message);
                }
            }

            log::debug!("visited {}", file.rel_path());
            files.insert(path, file);
        }

        log::info!(
            "Reachability: {} files, {} edges from {} entries",
            files.len(),
            graph.edge_count(),
            entry_paths.len()
        );

        Ok(ReachableSet {
            root: self.project_root.clone(),
            entries: entry_paths,
            files,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_imports::{ImportResolver, ResolverConfig};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn builder(root: &Path) -> GraphBuilder {
        let resolver = ImportResolver::new(ResolverConfig::new(root)).unwrap();
        GraphBuilder::new(ImportExtractor::new(resolver), "src")
    }

    #[test]
    fn test_missing_entry_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = builder(temp.path()).build(&["src/main.tsx"]).unwrap_err();
        assert!(matches!(err, GraphError::MissingEntry(_)), "{err}");
    }

    #[test]
    fn test_edges_outside_source_root_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "import '../scripts/seed';\nimport './app';\n");
        write(root, "src/app.ts", "export const app = 1;\n");
        write(root, "scripts/seed.ts", "export {};\n");

        let set = builder(root).build(&["src/main.ts"]).unwrap();
        let rel: Vec<String> = set.rel_paths().into_iter().collect();
        assert_eq!(rel, ["src/app.ts", "src/main.ts"]);
    }

    #[test]
    fn test_type_only_imports_add_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "src/main.ts",
            "import type { Config } from './config';\nimport { type Theme } from './theme';\n",
        );
        write(root, "src/config.ts", "export type Config = {};\n");
        write(root, "src/theme.ts", "export type Theme = {};\n");

        let set = builder(root).build(&["src/main.ts"]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_failure_keeps_walking_other_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/main.ts", "import './broken';\nimport './ok';\n");
        write(root, "src/broken.ts", "import { from './never';\n");
        write(root, "src/ok.ts", "export const ok = true;\n");

        let set = builder(root).build(&["src/main.ts"]).unwrap();
        assert_eq!(set.len(), 3);
        let failures: Vec<&str> = set.parse_failures().map(|(f, _)| f.rel_path()).collect();
        assert_eq!(failures, ["src/broken.ts"]);
    }
}

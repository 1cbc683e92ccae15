use crate::config::ResolverConfig;
use crate::error::{ImportError, Result};
use crate::types::Resolution;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Turns `(importing file, specifier)` into an on-disk file, an unresolved
/// candidate, or an external package.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    root: PathBuf,
    /// Longest prefix first so `@/components/` wins over `@/`
    aliases: Vec<(String, PathBuf)>,
    extensions: Vec<String>,
}

impl ImportResolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate().map_err(ImportError::invalid_config)?;

        let root = normalize_path(&config.project_root);
        let mut aliases: Vec<(String, PathBuf)> = config
            .aliases
            .into_iter()
            .map(|(prefix, target)| {
                let target = target.trim_start_matches("./").trim_end_matches('/');
                (prefix, normalize_path(&root.join(target)))
            })
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            root,
            aliases,
            extensions: config.extensions,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, importer: &Path, specifier: &str) -> Resolution {
        let specifier = strip_query(specifier.trim());

        let base = if let Some(target) = self.alias_target(specifier) {
            target
        } else if is_relative_specifier(specifier) {
            let dir = importer.parent().unwrap_or(&self.root);
            dir.join(specifier)
        } else {
            return Resolution::External;
        };

        let base = normalize_path(&base);
        match self.probe(&base) {
            Some(found) => Resolution::Local(found),
            None => {
                log::debug!(
                    "unresolved import '{specifier}' from {}",
                    importer.display()
                );
                Resolution::Unresolved(base)
            }
        }
    }

    fn alias_target(&self, specifier: &str) -> Option<PathBuf> {
        for (prefix, target) in &self.aliases {
            let Some(rest) = specifier.strip_prefix(prefix.as_str()) else {
                continue;
            };
            // `@ui` must not capture `@uikit/button`
            if !(prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/')) {
                continue;
            }
            let rest = rest.trim_start_matches('/');
            return Some(if rest.is_empty() {
                target.clone()
            } else {
                target.join(rest)
            });
        }
        None
    }

    /// exact path, then path + extension, then directory index
    fn probe(&self, base: &Path) -> Option<PathBuf> {
        if base.is_file() {
            return Some(base.to_path_buf());
        }

        for ext in &self.extensions {
            let mut candidate: OsString = base.as_os_str().to_os_string();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        for ext in &self.extensions {
            let candidate = base.join(format!("index{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        None
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn strip_query(specifier: &str) -> &str {
    specifier
        .split_once(['?', '#'])
        .map_or(specifier, |(path, _)| path)
}

/// Folds `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "export {};\n").unwrap();
        path
    }

    fn resolver(root: &Path) -> ImportResolver {
        ImportResolver::new(
            ResolverConfig::new(root)
                .alias("@/", "src/")
                .alias("@ui", "src/components/ui"),
        )
        .unwrap()
    }

    #[test]
    fn relative_specifiers_probe_extensions_in_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let importer = touch(root, "src/pages/Home.tsx");
        let ts = touch(root, "src/pages/util.ts");
        touch(root, "src/pages/util.tsx");

        let resolver = resolver(root);
        assert_eq!(
            resolver.resolve(&importer, "./util"),
            Resolution::Local(normalize_path(&ts))
        );
    }

    #[test]
    fn exact_path_wins_over_extension_probe() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let importer = touch(root, "src/main.tsx");
        let css = touch(root, "src/index.css");

        let resolver = resolver(root);
        assert_eq!(
            resolver.resolve(&importer, "./index.css"),
            Resolution::Local(normalize_path(&css))
        );
    }

    #[test]
    fn directories_resolve_to_index_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let importer = touch(root, "src/pages/Home.tsx");
        let barrel = touch(root, "src/components/index.ts");

        let resolver = resolver(root);
        assert_eq!(
            resolver.resolve(&importer, "../components"),
            Resolution::Local(normalize_path(&barrel))
        );
        assert_eq!(
            resolver.resolve(&importer, "@/components"),
            Resolution::Local(normalize_path(&barrel))
        );
    }

    #[test]
    fn alias_prefixes_respect_segment_boundaries() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let importer = touch(root, "src/App.tsx");
        let button = touch(root, "src/components/ui/Button.tsx");

        let resolver = resolver(root);
        assert_eq!(
            resolver.resolve(&importer, "@ui/Button"),
            Resolution::Local(normalize_path(&button))
        );
        assert_eq!(resolver.resolve(&importer, "@uikit/core"), Resolution::External);
    }

    #[test]
    fn packages_are_external_and_misses_are_unresolved() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let importer = touch(root, "src/App.tsx");

        let resolver = resolver(root);
        assert_eq!(resolver.resolve(&importer, "react"), Resolution::External);
        assert_eq!(
            resolver.resolve(&importer, "./missing"),
            Resolution::Unresolved(normalize_path(&root.join("src/missing")))
        );
    }

    #[test]
    fn query_suffixes_are_ignored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let importer = touch(root, "src/App.tsx");
        let svg = touch(root, "src/logo.svg");

        let resolver = resolver(root);
        assert_eq!(
            resolver.resolve(&importer, "./logo.svg?url"),
            Resolution::Local(normalize_path(&svg))
        );
    }

    #[test]
    fn normalize_folds_parent_components() {
        assert_eq!(
            normalize_path(Path::new("/repo/src/pages/../components/./Card")),
            PathBuf::from("/repo/src/components/Card")
        );
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }
}

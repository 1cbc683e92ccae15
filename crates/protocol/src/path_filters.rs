use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Component, Path};

use crate::ConfigError;

/// Root-relative, forward-slash form used for subjects and glob matching.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut out = String::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&part.to_string_lossy());
        }
    }
    if out.is_empty() {
        rel.to_string_lossy().replace('\\', "/")
    } else {
        out
    }
}

pub fn normalize_filter_path(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");
    while value.starts_with("./") {
        value = value[2..].to_string();
    }
    let value = value.trim_matches('/');
    if value == "." {
        return String::new();
    }
    value.to_string()
}

/// A compiled set of root-relative globs. `*` stops at `/`, `**` crosses it.
#[derive(Clone, Debug)]
pub struct PathGlobs {
    set: GlobSet,
    len: usize,
}

impl PathGlobs {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;
        for pattern in patterns {
            let normalized = normalize_filter_path(pattern.as_ref());
            if normalized.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(&normalized)
                .literal_separator(true)
                .build()
                .map_err(|err| {
                    ConfigError::invalid(format!("invalid glob '{}': {err}", pattern.as_ref()))
                })?;
            builder.add(glob);
            len += 1;
        }
        let set = builder
            .build()
            .map_err(|err| ConfigError::invalid(format!("invalid glob set: {err}")))?;
        Ok(Self { set, len })
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        self.len > 0 && self.set.is_match(normalize_filter_path(rel_path))
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn relative_display_uses_forward_slashes() {
        let root = PathBuf::from("/repo");
        let file = root.join("src").join("pages").join("Home.tsx");
        assert_eq!(relative_display(&root, &file), "src/pages/Home.tsx");
    }

    #[test]
    fn globs_do_not_cross_separators_with_single_star() {
        let globs = PathGlobs::new(&["src/pages/*.tsx", "src/components/**"]).unwrap();
        assert!(globs.is_match("src/pages/Home.tsx"));
        assert!(!globs.is_match("src/pages/nested/Home.tsx"));
        assert!(globs.is_match("src/components/ui/Button.tsx"));
        assert!(globs.is_match("./src/components/ui/Button.tsx"));
    }

    #[test]
    fn blank_patterns_do_not_match_everything() {
        let globs = PathGlobs::new(&["", "./"]).unwrap();
        assert!(globs.is_empty());
        assert!(!globs.is_match("src/lib.ts"));
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let err = PathGlobs::new(&["src/[oops"]).unwrap_err();
        assert!(err.to_string().contains("src/[oops"), "{err}");
    }
}

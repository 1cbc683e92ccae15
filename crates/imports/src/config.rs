use std::path::{Path, PathBuf};

/// Configuration for specifier resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Absolute project root; alias targets are joined onto it
    pub project_root: PathBuf,

    /// Specifier prefix -> directory relative to the project root
    pub aliases: Vec<(String, String)>,

    /// Extensions probed after the exact path, in order
    pub extensions: Vec<String>,
}

impl ResolverConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            aliases: Vec::new(),
            extensions: [".ts", ".tsx", ".js", ".jsx"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn alias(mut self, prefix: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((prefix.into(), target.into()));
        self
    }

    #[must_use]
    pub fn extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions.iter().map(|e| e.as_ref().to_string()).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.project_root
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some((prefix, _)) = self.aliases.iter().find(|(prefix, _)| prefix.is_empty()) {
            return Err(format!("alias prefix '{prefix}' must not be empty"));
        }

        if let Some(ext) = self.extensions.iter().find(|ext| !ext.starts_with('.')) {
            return Err(format!("extension '{ext}' must start with '.'"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extensions() {
        let config = ResolverConfig::new("/repo");
        assert_eq!(config.extensions, vec![".ts", ".tsx", ".js", ".jsx"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = ResolverConfig::new("/repo").alias("", "src");
        assert!(config.validate().is_err());

        let config = ResolverConfig::new("/repo").extensions(&["tsx"]);
        assert!(config.validate().is_err());
    }
}

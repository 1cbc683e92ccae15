use crate::error::{ImportError, Result};
use std::path::Path;

/// Source dialects the extractor can parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    /// Styles, images and other assets: reachable leaves, never parsed
    Asset,
}

impl SourceLanguage {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => SourceLanguage::JavaScript,
            "ts" | "mts" | "cts" => SourceLanguage::TypeScript,
            "tsx" => SourceLanguage::Tsx,
            _ => SourceLanguage::Asset,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(SourceLanguage::Asset)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
            SourceLanguage::Tsx => "tsx",
            SourceLanguage::Asset => "asset",
        }
    }

    /// Whether files of this kind carry import declarations
    pub fn is_script(self) -> bool {
        !matches!(self, SourceLanguage::Asset)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            SourceLanguage::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
            SourceLanguage::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            SourceLanguage::Tsx => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
            SourceLanguage::Asset => Err(ImportError::unsupported_language(self.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceLanguage::from_extension("ts"), SourceLanguage::TypeScript);
        assert_eq!(SourceLanguage::from_extension("TSX"), SourceLanguage::Tsx);
        assert_eq!(SourceLanguage::from_extension("jsx"), SourceLanguage::JavaScript);
        assert_eq!(SourceLanguage::from_extension("mjs"), SourceLanguage::JavaScript);
        assert_eq!(SourceLanguage::from_extension("css"), SourceLanguage::Asset);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(SourceLanguage::from_path("src/main.tsx"), SourceLanguage::Tsx);
        assert_eq!(SourceLanguage::from_path("src/index.css"), SourceLanguage::Asset);
        assert_eq!(SourceLanguage::from_path("Makefile"), SourceLanguage::Asset);
    }

    #[test]
    fn test_tree_sitter_language() {
        assert!(SourceLanguage::JavaScript.tree_sitter_language().is_ok());
        assert!(SourceLanguage::TypeScript.tree_sitter_language().is_ok());
        assert!(SourceLanguage::Tsx.tree_sitter_language().is_ok());
        assert!(SourceLanguage::Asset.tree_sitter_language().is_err());
    }
}

use thiserror::Error;

/// Result type for import extraction
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that can occur while reading or parsing one source file
#[derive(Error, Debug)]
pub enum ImportError {
    /// The grammar produced a tree with syntax errors
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No grammar is registered for this file type
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Invalid resolver configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl ImportError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}

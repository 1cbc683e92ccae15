use contract_graph::GraphError;
use contract_imports::ImportError;
use contract_protocol::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuleError>;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("component '{0}' is listed more than once")]
    DuplicateComponent(String),

    #[error("invalid pattern '{id}': {message}")]
    InvalidPattern { id: String, message: String },

    #[error("cannot walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

impl RuleError {
    pub fn invalid_pattern(id: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            id: id.into(),
            message: err.to_string(),
        }
    }
}

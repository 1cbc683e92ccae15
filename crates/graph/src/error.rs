use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("entry file not found: {0}")]
    MissingEntry(PathBuf),

    #[error("no entry files configured")]
    NoEntries,
}

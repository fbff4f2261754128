use std::path::PathBuf;

use postwise_core::errors::ApplicationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to access {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("failed to parse JSON {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{path} is missing column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path} line {line}: {detail}")]
    InvalidRow { path: PathBuf, line: u64, detail: String },
    #[error("invalid table {path}: {detail}")]
    InvalidTable { path: PathBuf, detail: String },
    #[error("invalid model {path}: {detail}")]
    InvalidModel { path: PathBuf, detail: String },
    #[error("model bundle rejected: {0}")]
    Bundle(String),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}

impl From<DataError> for ApplicationError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::InvalidModel { .. } | DataError::Bundle(_) => {
                ApplicationError::Model(error.to_string())
            }
            other => ApplicationError::Data(other.to_string()),
        }
    }
}

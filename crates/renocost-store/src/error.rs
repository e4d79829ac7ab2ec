use std::path::PathBuf;

use renocost_types::{Error, ExportError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("record store path not configured")]
    MissingPath,
    #[error("failed to open database at {path}: {source}")]
    OpenDatabase {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("invalid {table} record: {message}")]
    InvalidRecord {
        table: &'static str,
        message: String,
    },
    #[error("cannot export to {path}: {message}")]
    Export { path: PathBuf, message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Export { path, message } => Error::Export(ExportError { path, message }),
            StoreError::OpenDatabase { path, source } => Error::Storage(StorageError::Open {
                path,
                message: source.to_string(),
            }),
            StoreError::Database(source @ rusqlite::Error::FromSqlConversionFailure(..)) => {
                Error::Storage(StorageError::Corrupted(source.to_string()))
            }
            StoreError::Database(source) => Error::Storage(StorageError::Database(source.to_string())),
            StoreError::Io(source) => Error::Storage(StorageError::Io(source.to_string())),
            StoreError::Serde(source) => Error::Storage(StorageError::Corrupted(source.to_string())),
            StoreError::MissingPath => {
                Error::Storage(StorageError::Database("record store path not configured".to_string()))
            }
            StoreError::InvalidRecord { table, message } => {
                Error::Validation(format!("invalid {table} record: {message}"))
            }
        }
    }
}

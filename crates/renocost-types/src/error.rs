//! Error types for renocost

use std::path::PathBuf;

use thiserror::Error;

use crate::types::RecordKind;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Persistence failures of the record store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open record store at {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored record is corrupted: {0}")]
    Corrupted(String),

    #[error("Record store IO error: {0}")]
    Io(String),
}

/// The export destination could not be written
#[derive(Debug, Error)]
#[error("Cannot export to {}: {message}", path.display())]
pub struct ExportError {
    pub path: PathBuf,
    pub message: String,
}

/// Service type outside the recognized set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported service type: {0:?}")]
pub struct UnsupportedServiceError(pub String);

/// A referenced record does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {id} not found")]
pub struct NotFoundError {
    pub kind: RecordKind,
    pub id: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error(transparent)]
    UnsupportedService(#[from] UnsupportedServiceError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider directory error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Excel export error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;

use renocost_types::{Error, ServiceType};
use thiserror::Error;

/// Why a model could not be used
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model artifact at {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read model artifact {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed model artifact {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported model format {0:?}")]
    UnsupportedFormat(String),

    #[error("model artifact is for {found:?}, expected {expected}")]
    ServiceMismatch { expected: ServiceType, found: String },

    #[error("non-finite weight for {0:?}")]
    InvalidWeight(String),

    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Read { source, .. } => Error::Io(source),
            ModelError::Malformed { source, .. } => Error::Json(source),
            other => Error::Validation(other.to_string()),
        }
    }
}

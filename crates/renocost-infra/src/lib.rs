//! Infrastructure layer
//!
//! File-backed provider directory and photo upload handling.

pub mod persistence;
pub mod provider_catalog;
pub mod uploads;

pub use persistence::FileProviderDirectory;
pub use provider_catalog::ProviderCatalog;
pub use uploads::{is_supported_photo, validate_photo, PhotoUploads};

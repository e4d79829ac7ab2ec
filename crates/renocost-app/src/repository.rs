//! Openers for the persistence and lookup adapters

use std::path::Path;

use renocost_estimator::EstimationEngine;
use renocost_infra::{FileProviderDirectory, PhotoUploads};
use renocost_store::SqliteRecordStore;
use renocost_types::Result;

use crate::config::Config;

/// Open the record store, creating the database if needed
pub fn open_record_store(config: &Config) -> Result<SqliteRecordStore> {
    open_record_store_at(&config.store_path()?)
}

/// Open a record store at a custom path
pub fn open_record_store_at(path: &Path) -> Result<SqliteRecordStore> {
    SqliteRecordStore::open(path).map_err(Into::into)
}

/// Open the provider directory, falling back to the built-in catalogue
pub fn open_provider_directory(config: &Config) -> Result<FileProviderDirectory> {
    FileProviderDirectory::open(config.providers_file()?)
}

/// Estimation engine reading models from the configured directory
pub fn open_estimation_engine(config: &Config) -> Result<EstimationEngine> {
    Ok(EstimationEngine::new(
        Some(config.models_dir()?),
        config.rates.clone(),
    ))
}

pub fn open_uploads(config: &Config) -> Result<PhotoUploads> {
    Ok(PhotoUploads::new(config.uploads_dir()?))
}

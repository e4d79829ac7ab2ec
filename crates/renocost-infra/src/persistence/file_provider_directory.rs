//! File-based implementation of ProviderDirectory

use std::path::{Path, PathBuf};

use renocost_domain::repository::ProviderDirectory;
use renocost_types::{Provider, Result};

use crate::provider_catalog::ProviderCatalog;

/// Provider directory loaded from a JSON or TOML file.
///
/// Falls back to the built-in catalogue when the file does not exist.
#[derive(Debug, Clone)]
pub struct FileProviderDirectory {
    path: Option<PathBuf>,
    catalog: ProviderCatalog,
}

impl FileProviderDirectory {
    pub fn open(path: PathBuf) -> Result<Self> {
        let catalog = if path.exists() {
            ProviderCatalog::load_from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no provider file, using built-in catalogue");
            ProviderCatalog::builtin()
        };
        Ok(Self {
            path: Some(path),
            catalog,
        })
    }

    pub fn builtin() -> Self {
        Self {
            path: None,
            catalog: ProviderCatalog::builtin(),
        }
    }

    pub fn from_catalog(catalog: ProviderCatalog) -> Self {
        Self {
            path: None,
            catalog,
        }
    }

    /// Seed `path` with the built-in catalogue
    pub fn write_default(path: &Path) -> Result<()> {
        ProviderCatalog::builtin().save(path)?;
        tracing::info!(path = %path.display(), "wrote default provider catalogue");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the backing file
    pub fn reload(&mut self) -> Result<()> {
        if let Some(path) = self.path.clone() {
            *self = Self::open(path)?;
        }
        Ok(())
    }
}

impl ProviderDirectory for FileProviderDirectory {
    fn all(&self) -> Result<Vec<Provider>> {
        Ok(self.catalog.providers().to_vec())
    }
}

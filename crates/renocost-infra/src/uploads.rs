//! Photo upload handling
//!
//! Only JPEG and PNG files are accepted. Imported photos are copied into the
//! uploads directory under a content-hash prefix so re-importing the same
//! file is a no-op.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use sha2::{Digest, Sha256};

use renocost_types::{Error, Result};

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Hex characters of the content hash kept in the stored file name
const HASH_PREFIX_LEN: usize = 12;

/// Check if a path has a JPG/PNG extension
pub fn is_supported_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PHOTO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Validate that a photo exists and decodes as JPEG or PNG
pub fn validate_photo(path: &Path) -> Result<()> {
    read_photo(path).map(|_| ())
}

fn read_photo(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::Validation(format!(
            "photo {} does not exist or is not a file",
            path.display()
        )));
    }
    if !is_supported_photo(path) {
        return Err(Error::Validation(format!(
            "unsupported photo format: {} (JPG or PNG only)",
            path.display()
        )));
    }

    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(Error::Validation(format!(
            "{} is a {:?} image, expected JPG or PNG",
            path.display(),
            format
        )));
    }
    image::load_from_memory_with_format(&bytes, format)?;
    Ok(bytes)
}

/// Uploads directory
#[derive(Debug, Clone)]
pub struct PhotoUploads {
    dir: PathBuf,
}

impl PhotoUploads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate `source` and copy it into the uploads directory.
    ///
    /// Returns the stored path, `<dir>/<sha256-prefix>_<file name>`.
    pub fn import(&self, source: &Path) -> Result<PathBuf> {
        let bytes = read_photo(source)?;
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Validation(format!("invalid photo path: {}", source.display())))?;

        let digest = format!("{:x}", Sha256::digest(&bytes));
        let dest = self
            .dir
            .join(format!("{}_{}", &digest[..HASH_PREFIX_LEN], file_name));

        if dest.exists() {
            tracing::debug!(path = %dest.display(), "photo already imported");
            return Ok(dest);
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(&dest, &bytes)?;
        tracing::info!(source = %source.display(), path = %dest.display(), "photo imported");
        Ok(dest)
    }
}

//! Delivery of encoded bytes to the user

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// MIME type of an xlsx package
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// File extension appended to download names that lack it
pub const XLSX_EXTENSION: &str = ".xlsx";

/// Hands encoded bytes to the user under `filename`
pub trait Deliver {
    /// Returns where the bytes ended up
    fn deliver(&self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<PathBuf>;
}

/// Writes the bytes to a file below `dir`. Absolute filenames are used as-is.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for FileDelivery {
    /// Relative to the current directory
    fn default() -> Self {
        Self::new(".")
    }
}

impl Deliver for FileDelivery {
    fn deliver(&self, bytes: &[u8], filename: &str, mime_type: &str) -> Result<PathBuf> {
        let path = self.dir.join(filename);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::info!(
            "wrote {} bytes ({}) to {}",
            bytes.len(),
            mime_type,
            path.display()
        );
        Ok(path)
    }
}

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::Result;

/// A file written beside its target and renamed over it on commit. Dropping
/// it uncommitted removes the temporary file and leaves the target untouched.
pub struct AtomicFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl AtomicFile {
    pub fn create(target: &Path) -> Result<Self> {
        let dir = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        Ok(Self {
            temp: NamedTempFile::new_in(dir)?,
            target: target.to_path_buf(),
        })
    }

    /// A handle to the temporary file.
    pub fn file(&self) -> Result<File> {
        Ok(self.temp.as_file().try_clone()?)
    }

    pub fn commit(self) -> Result<()> {
        self.temp.persist(&self.target).map_err(|e| e.error)?;
        Ok(())
    }
}

use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::Result;
use crate::models::{Dataset, RawTable};
use crate::processors::orchestrator::RawSnapshots;
use crate::readers::TableReader;

/// Locations of the three raw snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub epa: PathBuf,
    pub nhtsa: PathBuf,
    pub doe: PathBuf,
}

impl SnapshotPaths {
    pub fn in_dir(raw_dir: &Path, epa_file: &str, nhtsa_file: &str, doe_file: &str) -> Self {
        Self {
            epa: raw_dir.join(epa_file),
            nhtsa: raw_dir.join(nhtsa_file),
            doe: raw_dir.join(doe_file),
        }
    }

    pub fn get(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Epa => &self.epa,
            Dataset::Nhtsa => &self.nhtsa,
            Dataset::Doe => &self.doe,
        }
    }
}

/// Reads the three snapshots concurrently. A file that cannot be read fails
/// only its own dataset.
pub struct ConcurrentReader;

impl ConcurrentReader {
    pub fn new() -> Self {
        Self
    }

    pub async fn read_all(&self, paths: &SnapshotPaths) -> Result<RawSnapshots> {
        let epa_handle = Self::spawn_read(Dataset::Epa, paths.get(Dataset::Epa));
        let nhtsa_handle = Self::spawn_read(Dataset::Nhtsa, paths.get(Dataset::Nhtsa));
        let doe_handle = Self::spawn_read(Dataset::Doe, paths.get(Dataset::Doe));

        // Wait for all reads to complete
        let (epa, nhtsa, doe) = tokio::try_join!(epa_handle, nhtsa_handle, doe_handle)?;

        Ok(RawSnapshots { epa, nhtsa, doe })
    }

    fn spawn_read(dataset: Dataset, path: &Path) -> JoinHandle<Result<RawTable>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let result = TableReader::for_dataset(dataset).read_path(&path);
            if let Err(e) = &result {
                warn!(%dataset, path = %path.display(), error = %e, "snapshot could not be read");
            }
            result
        })
    }
}

impl Default for ConcurrentReader {
    fn default() -> Self {
        Self::new()
    }
}

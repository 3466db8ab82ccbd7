use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::readers::SnapshotPaths;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_MIN_COMPREHENSIVE_ROWS, DEFAULT_MIN_INFRASTRUCTURE_ROWS,
    DEFAULT_MIN_VEHICLE_ROWS, DEFAULT_ROW_GROUP_SIZE, DOE_FILE, EPA_FILE, NHTSA_FILE,
};
use crate::writers::OutputFormat;

pub const ENV_PREFIX: &str = "VDP";

/// Minimum row counts a healthy national run is expected to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegritySettings {
    pub min_vehicle_rows: usize,
    pub min_infrastructure_rows: usize,
    pub min_comprehensive_rows: usize,
}

/// Run settings, layered: defaults, then an optional TOML file, then
/// `VDP_*` environment variables. CLI flags are applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub epa_file: String,
    pub nhtsa_file: String,
    pub doe_file: String,
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub compression: String,

    #[validate(range(min = 1))]
    pub row_group_size: usize,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub integrity: IntegritySettings,
}

impl PipelineConfig {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("raw_dir", "data/raw")?
            .set_default("epa_file", EPA_FILE)?
            .set_default("nhtsa_file", NHTSA_FILE)?
            .set_default("doe_file", DOE_FILE)?
            .set_default("format", "parquet")?
            .set_default("compression", COMPRESSION_SNAPPY)?
            .set_default("row_group_size", DEFAULT_ROW_GROUP_SIZE as i64)?
            .set_default("max_workers", num_cpus::get() as i64)?
            .set_default("integrity.min_vehicle_rows", DEFAULT_MIN_VEHICLE_ROWS as i64)?
            .set_default(
                "integrity.min_infrastructure_rows",
                DEFAULT_MIN_INFRASTRUCTURE_ROWS as i64,
            )?
            .set_default(
                "integrity.min_comprehensive_rows",
                DEFAULT_MIN_COMPREHENSIVE_ROWS as i64,
            )?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: PipelineConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn snapshot_paths(&self) -> SnapshotPaths {
        SnapshotPaths::in_dir(&self.raw_dir, &self.epa_file, &self.nhtsa_file, &self.doe_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = PipelineConfig::load(None)?;

        assert_eq!(config.epa_file, EPA_FILE);
        assert_eq!(config.format, OutputFormat::Parquet);
        assert_eq!(config.integrity.min_infrastructure_rows, 30);
        assert!(config.max_workers >= 1);
        assert_eq!(
            config.snapshot_paths().nhtsa,
            PathBuf::from("data/raw").join(NHTSA_FILE)
        );
        Ok(())
    }

    #[test]
    fn test_file_overrides_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "raw_dir = \"/srv/snapshots\"\nformat = \"csv\"\nmax_workers = 3\n\n[integrity]\nmin_vehicle_rows = 10"
        )?;

        let config = PipelineConfig::load(Some(file.path()))?;

        assert_eq!(config.raw_dir, PathBuf::from("/srv/snapshots"));
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.integrity.min_vehicle_rows, 10);
        assert_eq!(config.integrity.min_comprehensive_rows, 20000);
        Ok(())
    }

    #[test]
    fn test_zero_workers_rejected() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "max_workers = 0")?;

        assert!(PipelineConfig::load(Some(file.path())).is_err());
        Ok(())
    }
}

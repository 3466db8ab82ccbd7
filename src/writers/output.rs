use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::processors::orchestrator::IntegrationRun;
use crate::utils::constants::{
    COMPREHENSIVE_TABLE, DOE_CLEAN_TABLE, EPA_CLEAN_TABLE, FUEL_INFRASTRUCTURE_TABLE,
    INTEGRATED_DIR, NHTSA_CLEAN_TABLE, PROCESSED_DIR, RUN_REPORT_FILE, VEHICLE_COMPLAINTS_TABLE,
};
use crate::writers::atomic::AtomicFile;
use crate::writers::csv_writer::CsvWriter;
use crate::writers::parquet_writer::ParquetWriter;
use crate::writers::record_batch::ToRecordBatch;
use crate::writers::OutputFormat;

/// Lays out a run's tables under one output root:
/// cleaned tables in `processed/`, joined tables in `integrated/`.
pub struct OutputWriter {
    root: PathBuf,
    format: OutputFormat,
    parquet: ParquetWriter,
    csv: CsvWriter,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: OutputFormat::default(),
            parquet: ParquetWriter::new(),
            csv: CsvWriter::new(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_parquet_writer(mut self, writer: ParquetWriter) -> Self {
        self.parquet = writer;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, dir: &str, table: &str) -> PathBuf {
        self.root
            .join(dir)
            .join(format!("{}.{}", table, self.format.extension()))
    }

    /// Write every table the run produced plus the run report. Tables the
    /// run could not build are skipped; existing files are replaced whole.
    pub fn write_run(&self, run: &IntegrationRun) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if let Some(table) = &run.epa {
            written.push(self.write(&table.rows, PROCESSED_DIR, EPA_CLEAN_TABLE)?);
        }
        if let Some(table) = &run.nhtsa {
            written.push(self.write(&table.rows, PROCESSED_DIR, NHTSA_CLEAN_TABLE)?);
        }
        if let Some(table) = &run.doe {
            written.push(self.write(&table.rows, PROCESSED_DIR, DOE_CLEAN_TABLE)?);
        }
        if let Some(rows) = &run.vehicle_complaints {
            written.push(self.write(rows, INTEGRATED_DIR, VEHICLE_COMPLAINTS_TABLE)?);
        }
        if let Some(rows) = &run.fuel_infrastructure {
            written.push(self.write(rows, INTEGRATED_DIR, FUEL_INFRASTRUCTURE_TABLE)?);
        }
        if let Some(rows) = &run.comprehensive {
            written.push(self.write(rows, INTEGRATED_DIR, COMPREHENSIVE_TABLE)?);
        }

        written.push(self.write_report(run)?);
        Ok(written)
    }

    fn write<T: ToRecordBatch>(&self, rows: &[T], dir: &str, table: &str) -> Result<PathBuf> {
        let path = self.table_path(dir, table);
        match self.format {
            OutputFormat::Parquet => self.parquet.write_table(rows, &path)?,
            OutputFormat::Csv => self.csv.write_table(rows, &path)?,
        }
        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    fn write_report(&self, run: &IntegrationRun) -> Result<PathBuf> {
        let path = self.root.join(RUN_REPORT_FILE);
        let target = AtomicFile::create(&path)?;
        serde_json::to_writer_pretty(target.file()?, &run.report())?;
        target.commit()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::station::fixtures::station;
    use crate::models::{Dataset, FuelTypeCode, StationStatus};
    use crate::processors::cleaning::CleanedTable;
    use crate::processors::orchestrator::DatasetFailure;
    use crate::processors::report::CleaningReport;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn partial_run() -> IntegrationRun {
        let stations = vec![
            station("1", FuelTypeCode::Elec, StationStatus::Available),
            station("2", FuelTypeCode::Cng, StationStatus::Planned),
        ];
        IntegrationRun {
            reference_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            epa: None,
            nhtsa: None,
            doe: Some(CleanedTable {
                rows: stations,
                report: CleaningReport::new(Dataset::Doe, 2),
            }),
            vehicle_complaints: None,
            fuel_infrastructure: None,
            comprehensive: None,
            failures: vec![
                DatasetFailure {
                    dataset: Dataset::Epa,
                    error: "missing column".to_string(),
                },
                DatasetFailure {
                    dataset: Dataset::Nhtsa,
                    error: "missing file".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_partial_run_writes_surviving_tables() -> Result<()> {
        let dir = TempDir::new()?;
        let writer = OutputWriter::new(dir.path());

        let written = writer.write_run(&partial_run())?;

        assert_eq!(written.len(), 2);
        assert!(dir
            .path()
            .join("processed/doe_fuel_stations_clean.parquet")
            .exists());
        assert!(!dir.path().join(INTEGRATED_DIR).exists());

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(RUN_REPORT_FILE))?)?;
        assert_eq!(report["failures"].as_array().map(Vec::len), Some(2));
        assert_eq!(report["table_rows"][DOE_CLEAN_TABLE], 2);
        Ok(())
    }

    #[test]
    fn test_csv_format_paths() -> Result<()> {
        let dir = TempDir::new()?;
        let writer = OutputWriter::new(dir.path()).with_format(OutputFormat::Csv);

        writer.write_run(&partial_run())?;

        let path = writer.table_path(PROCESSED_DIR, DOE_CLEAN_TABLE);
        assert!(path.ends_with("processed/doe_fuel_stations_clean.csv"));
        assert_eq!(std::fs::read_to_string(path)?.lines().count(), 3);
        Ok(())
    }
}

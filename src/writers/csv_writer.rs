use arrow::csv::WriterBuilder;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::utils::constants::DEFAULT_BATCH_SIZE;
use crate::writers::atomic::AtomicFile;
use crate::writers::record_batch::ToRecordBatch;

/// Writes output tables as headered CSV through Arrow's CSV writer.
pub struct CsvWriter {
    batch_size: usize,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Write a table, replacing any previous file at `path`.
    pub fn write_table<T: ToRecordBatch>(&self, rows: &[T], path: &Path) -> Result<()> {
        let target = AtomicFile::create(path)?;

        {
            let mut writer = WriterBuilder::new().with_header(true).build(target.file()?);

            // The header comes from the first batch, so an empty table still gets one
            if rows.is_empty() {
                writer.write(&T::to_record_batch(rows)?)?;
            }
            for chunk in rows.chunks(self.batch_size) {
                writer.write(&T::to_record_batch(chunk)?)?;
            }
        }

        target.commit()?;
        debug!(path = %path.display(), rows = rows.len(), "csv table written");
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelInfrastructureRecord, FuelTypeCode};
    use tempfile::TempDir;

    fn record(year: i32, per_station: Option<f64>) -> FuelInfrastructureRecord {
        FuelInfrastructureRecord {
            year,
            fuel_type_code: FuelTypeCode::Elec,
            vehicle_count: 3,
            avg_combined_mpg: Some(123.7),
            avg_city_mpg: None,
            avg_highway_mpg: Some(40.0),
            total_stations: 3,
            available_stations: 2,
            vehicles_per_station: per_station,
        }
    }

    #[test]
    fn test_csv_output() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("fuel_infrastructure_analysis.csv");

        CsvWriter::new()
            .with_batch_size(1)
            .write_table(&[record(2020, Some(1.5)), record(2021, None)], &path)?;

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("year,fuel_type_code,vehicle_count"));
        assert!(lines[1].starts_with("2020,ELEC,3,123.7,,40"));
        assert!(lines[1].ends_with(",1.5"));
        assert!(lines[2].ends_with(","));
        Ok(())
    }

    #[test]
    fn test_empty_table_has_header() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("empty.csv");

        CsvWriter::new().write_table::<FuelInfrastructureRecord>(&[], &path)?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.lines().count(), 1);
        Ok(())
    }
}

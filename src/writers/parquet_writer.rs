use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_BATCH_SIZE, DEFAULT_ROW_GROUP_SIZE,
};
use crate::writers::atomic::AtomicFile;
use crate::writers::record_batch::ToRecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::path::Path;
use tracing::debug;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Write a table in batches, replacing any previous file at `path`.
    pub fn write_table<T: ToRecordBatch>(&self, rows: &[T], path: &Path) -> Result<()> {
        let schema = T::schema();
        let target = AtomicFile::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(target.file()?, schema, Some(props))?;

        for chunk in rows.chunks(self.batch_size) {
            let batch = T::to_record_batch(chunk)?;
            writer.write(&batch)?;
        }

        writer.close()?;
        target.commit()?;

        debug!(path = %path.display(), rows = rows.len(), "parquet table written");
        Ok(())
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};
        use std::fs::File;

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = metadata.row_groups().iter().map(|rg| rg.num_rows()).collect();

        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        // Compression as actually stored, not as configured on this writer
        let compression = metadata
            .row_groups()
            .first()
            .and_then(|rg| rg.columns().first())
            .map(|column| column.compression())
            .unwrap_or(self.compression);

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
            columns,
        })
    }

    /// Render the first `limit` rows of a file as `column=value` lines.
    pub fn read_sample_rows(&self, path: &Path, limit: usize) -> Result<Vec<String>> {
        use arrow::util::display::{ArrayFormatter, FormatOptions};
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        if limit == 0 {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(limit)
            .build()?;

        let options = FormatOptions::default().with_null("null");
        let mut rows = Vec::new();

        for batch in reader {
            let batch = batch?;
            let schema = batch.schema();
            let formatters = batch
                .columns()
                .iter()
                .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for row in 0..batch.num_rows() {
                if rows.len() == limit {
                    return Ok(rows);
                }
                let line = schema
                    .fields()
                    .iter()
                    .zip(&formatters)
                    .map(|(field, formatter)| format!("{}={}", field.name(), formatter.value(row)))
                    .collect::<Vec<_>>()
                    .join(", ");
                rows.push(line);
            }
        }

        Ok(rows)
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub columns: Vec<String>,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.columns.len(),
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
            avg_rows
        )
    }
}

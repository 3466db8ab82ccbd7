pub mod atomic;
pub mod csv_writer;
pub mod output;
pub mod parquet_writer;
pub mod record_batch;

pub use atomic::AtomicFile;
pub use csv_writer::CsvWriter;
pub use output::OutputWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use record_batch::ToRecordBatch;

use serde::{Deserialize, Serialize};

/// On-disk format of the output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

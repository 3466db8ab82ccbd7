use encoding_rs::WINDOWS_1252;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Dataset, RawRecord, RawTable};
use crate::utils::constants::{NHTSA_COLUMNS, NHTSA_DELIMITER};

/// How column names are obtained.
#[derive(Debug, Clone, Copy)]
pub enum HeaderMode {
    /// First line is the header row
    Named,
    /// No header row; names are assigned to known positions
    Positional(&'static [(usize, &'static str)]),
}

/// Reads a delimited snapshot file into a [`RawTable`].
///
/// Fields are decoded as UTF-8, falling back to Windows-1252 for fields that
/// are not valid UTF-8. Rows may be ragged; missing trailing cells read as null.
pub struct TableReader {
    dataset: Dataset,
    delimiter: u8,
    quoting: bool,
    headers: HeaderMode,
}

impl TableReader {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            delimiter: b',',
            quoting: true,
            headers: HeaderMode::Named,
        }
    }

    /// Reader configured for the snapshot layout of a dataset.
    pub fn for_dataset(dataset: Dataset) -> Self {
        match dataset {
            Dataset::Epa | Dataset::Doe => Self::new(dataset),
            Dataset::Nhtsa => Self::new(dataset)
                .with_delimiter(NHTSA_DELIMITER)
                .with_quoting(false)
                .with_headers(HeaderMode::Positional(&NHTSA_COLUMNS)),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quoting(mut self, quoting: bool) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMode) -> Self {
        self.headers = headers;
        self
    }

    pub fn read_path(&self, path: &Path) -> Result<RawTable> {
        info!(dataset = %self.dataset, path = %path.display(), "reading snapshot");
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(matches!(self.headers, HeaderMode::Named))
            .quoting(self.quoting)
            .flexible(true)
            .from_reader(source);

        let named_headers = match self.headers {
            HeaderMode::Named => {
                let mut headers: Vec<String> = reader.byte_headers()?.iter().map(decode_field).collect();
                if let Some(first) = headers.first_mut() {
                    *first = first.trim_start_matches('\u{feff}').to_string();
                }
                Some(headers)
            }
            HeaderMode::Positional(_) => None,
        };

        let mut rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            rows.push(RawRecord::new(record.iter().map(decode_field).collect()));
        }

        let mut table = match (named_headers, self.headers) {
            (Some(headers), _) => RawTable::new(self.dataset, headers),
            (None, HeaderMode::Positional(names)) => {
                let known = names.iter().map(|(position, _)| position + 1).max().unwrap_or(0);
                let width = rows.iter().map(RawRecord::len).max().unwrap_or(0).max(known);
                RawTable::positional(self.dataset, width, names)
            }
            (None, HeaderMode::Named) => RawTable::new(self.dataset, Vec::new()),
        };

        for row in rows {
            table.push(row);
        }

        debug!(
            dataset = %self.dataset,
            columns = table.headers().len(),
            rows = table.len(),
            "snapshot parsed"
        );
        Ok(table)
    }
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

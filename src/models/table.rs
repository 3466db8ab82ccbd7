use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ProcessingError, Result};

/// The three source datasets the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dataset {
    /// EPA fuel-economy vehicle specifications
    Epa,
    /// NHTSA safety complaints
    Nhtsa,
    /// DOE alternative fuel stations
    Doe,
}

impl Dataset {
    pub fn display_name(&self) -> &'static str {
        match self {
            Dataset::Epa => "EPA",
            Dataset::Nhtsa => "NHTSA",
            Dataset::Doe => "DOE",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One source row exactly as read. Values are kept as text; blank cells read as null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<String>,
}

impl RawRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Value at a column position, `None` when the cell is absent or blank.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Like [`RawRecord::get`] for columns that may not exist in the table.
    pub fn get_opt(&self, index: Option<usize>) -> Option<&str> {
        index.and_then(|i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A raw snapshot table: named columns plus rows in input order.
#[derive(Debug, Clone)]
pub struct RawTable {
    dataset: Dataset,
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(dataset: Dataset, headers: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (position, name) in headers.iter().enumerate() {
            // First occurrence wins for repeated header names
            index.entry(name.trim().to_string()).or_insert(position);
        }

        Self {
            dataset,
            headers,
            index,
            rows: Vec::new(),
        }
    }

    /// Headers for a headerless file: known positions get their name, the
    /// rest `column_<n>`.
    pub fn positional(dataset: Dataset, width: usize, names: &[(usize, &str)]) -> Self {
        let headers = (0..width)
            .map(|position| {
                names
                    .iter()
                    .find(|(index, _)| *index == position)
                    .map(|(_, name)| name.to_string())
                    .unwrap_or_else(|| format!("column_{}", position))
            })
            .collect();
        Self::new(dataset, headers)
    }

    /// Build a table from in-memory text rows.
    pub fn from_rows<S: AsRef<str>>(dataset: Dataset, headers: &[S], rows: &[Vec<S>]) -> Self {
        let headers = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let mut table = Self::new(dataset, headers);
        for row in rows {
            table.push(RawRecord::new(
                row.iter().map(|v| v.as_ref().to_string()).collect(),
            ));
        }
        table
    }

    pub fn push(&mut self, record: RawRecord) {
        self.rows.push(record);
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column the pipeline cannot run without.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ProcessingError::schema(self.dataset, name))
    }

    /// Position of a column that may legitimately be absent.
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells_read_as_null() {
        let record = RawRecord::new(vec!["2011".to_string(), "  ".to_string(), String::new()]);

        assert_eq!(record.get(0), Some("2011"));
        assert_eq!(record.get(1), None);
        assert_eq!(record.get(2), None);
        assert_eq!(record.get(7), None);
        assert_eq!(record.get_opt(None), None);
    }

    #[test]
    fn test_column_lookup() {
        let table = RawTable::from_rows(
            Dataset::Epa,
            &["year", "make", "year"],
            &[vec!["2011", "Chevrolet", "1999"]],
        );

        assert_eq!(table.column("year").unwrap(), 0);
        assert_eq!(table.optional_column("make"), Some(1));
        assert_eq!(table.optional_column("VClass"), None);
        assert_eq!(table.len(), 1);

        match table.column("comb08") {
            Err(ProcessingError::Schema { dataset, column }) => {
                assert_eq!(dataset, Dataset::Epa);
                assert_eq!(column, "comb08");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_positional_headers() {
        let table = RawTable::positional(Dataset::Nhtsa, 4, &[(0, "ODINO"), (3, "MAKETXT")]);

        assert_eq!(table.headers(), &["ODINO", "column_1", "column_2", "MAKETXT"]);
        assert_eq!(table.column("MAKETXT").unwrap(), 3);
        assert!(table.column("MILEAGE").is_err());
    }
}

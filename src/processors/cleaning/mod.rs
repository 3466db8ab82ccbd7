//! Per-source cleaning pipelines.
//!
//! Each pipeline resolves its columns up front (a missing required column is a
//! schema error before any row is touched), normalizes every row, then runs
//! its fixed stage sequence. Every stage reports its row counts; a stage that
//! leaves nothing behind ends the pipeline with an empty-result error.

pub mod doe;
pub mod epa;
pub mod nhtsa;

pub use doe::DoePipeline;
pub use epa::EpaPipeline;
pub use nhtsa::NhtsaPipeline;

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, RawTable};
use crate::processors::report::{CleaningReport, StageReport};

/// Stage composition for one source dataset.
pub trait SourceCleaningPipeline {
    type Output;

    const DATASET: Dataset;

    fn clean(&self, table: &RawTable) -> Result<CleanedTable<Self::Output>>;
}

/// A cleaned dataset together with the report of how it was produced.
#[derive(Debug, Clone)]
pub struct CleanedTable<T> {
    pub rows: Vec<T>,
    pub report: CleaningReport,
}

impl<T> CleanedTable<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Running record of a pipeline's stages.
struct StageLog {
    report: CleaningReport,
}

impl StageLog {
    fn start(table: &RawTable) -> Result<Self> {
        let dataset = table.dataset();
        info!(%dataset, rows = table.len(), "cleaning started");

        if table.is_empty() {
            return Err(ProcessingError::empty_result(dataset, "input"));
        }

        Ok(Self {
            report: CleaningReport::new(dataset, table.len()),
        })
    }

    fn coercions(&mut self, failures: BTreeMap<&'static str, usize>) {
        for (field, count) in failures {
            warn!(dataset = %self.report.dataset, field, count, "values coerced to null");
            self.report.coercion_failures.insert(field.to_string(), count);
        }
    }

    /// Append a stage; fails when the stage left no rows.
    fn record(&mut self, stage: StageReport) -> Result<()> {
        info!(
            dataset = %self.report.dataset,
            stage = %stage.stage,
            rows_in = stage.rows_in,
            rows_out = stage.rows_out,
            "stage complete"
        );

        let emptied = stage.rows_out == 0;
        let name = stage.stage;
        self.report.output_rows = stage.rows_out;
        self.report.stages.push(stage);

        if emptied {
            return Err(ProcessingError::empty_result(self.report.dataset, name));
        }
        Ok(())
    }

    fn finish<T>(mut self, rows: Vec<T>) -> CleanedTable<T> {
        self.report.output_rows = rows.len();
        info!(
            dataset = %self.report.dataset,
            rows = rows.len(),
            retained_pct = self.report.retained_pct(),
            "cleaning finished"
        );
        CleanedTable {
            rows,
            report: self.report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::report::Stage;

    #[test]
    fn test_empty_input_is_fatal() {
        let table = RawTable::from_rows::<&str>(Dataset::Doe, &["id"], &[]);

        match StageLog::start(&table) {
            Err(ProcessingError::EmptyResult { dataset, stage }) => {
                assert_eq!(dataset, Dataset::Doe);
                assert_eq!(stage, "input");
            }
            other => panic!("expected empty result, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_emptying_stage_is_fatal() {
        let table = RawTable::from_rows(Dataset::Epa, &["year"], &[vec!["2011"]]);
        let mut log = StageLog::start(&table).unwrap();

        assert!(log.record(StageReport::new(Stage::CriticalFields, 1)).is_ok());

        let emptied = StageReport::new(Stage::Outliers, 1).finish(0);
        match log.record(emptied) {
            Err(ProcessingError::EmptyResult { stage, .. }) => assert_eq!(stage, "outliers"),
            other => panic!("expected empty result, got {:?}", other),
        }
        assert_eq!(log.report.stages.len(), 2);
    }
}

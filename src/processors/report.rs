use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ModelYearScope,
    CriticalFields,
    Outliers,
    Duplicates,
    FuelScope,
    Explosion,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ModelYearScope => "model_year_scope",
            Stage::CriticalFields => "critical_fields",
            Stage::Outliers => "outliers",
            Stage::Duplicates => "duplicates",
            Stage::FuelScope => "fuel_scope",
            Stage::Explosion => "explosion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Row counts for one stage of a cleaning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub drop_reasons: BTreeMap<String, usize>,
}

impl StageReport {
    pub fn new(stage: Stage, rows_in: usize) -> Self {
        Self {
            stage,
            rows_in,
            rows_out: rows_in,
            drop_reasons: BTreeMap::new(),
        }
    }

    pub fn record_drop(&mut self, reason: impl Into<String>) {
        *self.drop_reasons.entry(reason.into()).or_insert(0) += 1;
    }

    pub fn finish(mut self, rows_out: usize) -> Self {
        self.rows_out = rows_out;
        self
    }

    pub fn dropped(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }

    pub fn added(&self) -> usize {
        self.rows_out.saturating_sub(self.rows_in)
    }
}

/// Everything a cleaning pipeline observed while producing its table.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub dataset: Dataset,
    pub raw_rows: usize,
    pub coercion_failures: BTreeMap<String, usize>,
    pub stages: Vec<StageReport>,
    pub output_rows: usize,
}

impl CleaningReport {
    pub fn new(dataset: Dataset, raw_rows: usize) -> Self {
        Self {
            dataset,
            raw_rows,
            coercion_failures: BTreeMap::new(),
            stages: Vec::new(),
            output_rows: raw_rows,
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn retained_pct(&self) -> f64 {
        if self.raw_rows == 0 {
            return 0.0;
        }
        100.0 * self.output_rows as f64 / self.raw_rows as f64
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str(&format!("=== {} Cleaning Report ===\n", self.dataset));
        summary.push_str(&format!("Raw records: {}\n", self.raw_rows));

        if !self.coercion_failures.is_empty() {
            summary.push_str("Values coerced to null:\n");
            for (field, count) in &self.coercion_failures {
                summary.push_str(&format!("  {}: {}\n", field, count));
            }
        }

        for report in &self.stages {
            if report.added() > 0 {
                summary.push_str(&format!(
                    "{}: {} -> {} (+{} rows)\n",
                    report.stage,
                    report.rows_in,
                    report.rows_out,
                    report.added()
                ));
            } else {
                summary.push_str(&format!(
                    "{}: {} -> {} (-{} rows)\n",
                    report.stage,
                    report.rows_in,
                    report.rows_out,
                    report.dropped()
                ));
            }

            for (reason, count) in &report.drop_reasons {
                summary.push_str(&format!("    {}: {}\n", reason, count));
            }
        }

        summary.push_str(&format!(
            "Output records: {} ({:.1}% of raw)\n",
            self.output_rows,
            self.retained_pct()
        ));

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_counts() {
        let mut report = StageReport::new(Stage::Outliers, 10);
        report.record_drop("zero_mpg");
        report.record_drop("zero_mpg");
        report.record_drop("future_year");
        let report = report.finish(7);

        assert_eq!(report.dropped(), 3);
        assert_eq!(report.added(), 0);
        assert_eq!(report.drop_reasons.get("zero_mpg"), Some(&2));

        let explosion = StageReport::new(Stage::Explosion, 5).finish(8);
        assert_eq!(explosion.added(), 3);
        assert_eq!(explosion.dropped(), 0);
    }

    #[test]
    fn test_summary_mentions_every_stage() {
        let mut report = CleaningReport::new(Dataset::Doe, 4);
        report
            .stages
            .push(StageReport::new(Stage::CriticalFields, 4).finish(3));
        report.stages.push(StageReport::new(Stage::Duplicates, 3).finish(2));
        report.output_rows = 2;

        let summary = report.summary();
        assert!(summary.contains("DOE Cleaning Report"));
        assert!(summary.contains("critical_fields: 4 -> 3 (-1 rows)"));
        assert!(summary.contains("duplicates: 3 -> 2 (-1 rows)"));
        assert!(summary.contains("50.0% of raw"));
    }
}

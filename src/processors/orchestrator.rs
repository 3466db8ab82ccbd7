use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{
    ComplaintRecord, ComprehensiveVehicleRecord, Dataset, ExplodedVehicleFuelRecord,
    FuelInfrastructureRecord, RawTable, StationRecord, VehicleComplaintRecord,
};
use crate::processors::cleaning::{
    CleanedTable, DoePipeline, EpaPipeline, NhtsaPipeline, SourceCleaningPipeline,
};
use crate::processors::complaint_aggregator::ComplaintAggregator;
use crate::processors::infrastructure_aggregator::InfrastructureAggregator;
use crate::processors::join_engine::JoinEngine;
use crate::processors::outlier_filter::ReferenceDate;
use crate::processors::report::CleaningReport;
use crate::utils::constants::{
    COMPREHENSIVE_TABLE, DOE_CLEAN_TABLE, EPA_CLEAN_TABLE, FUEL_INFRASTRUCTURE_TABLE,
    NHTSA_CLEAN_TABLE, VEHICLE_COMPLAINTS_TABLE,
};
use crate::utils::progress::ProgressReporter;

/// The three raw snapshots, each possibly failed to load.
#[derive(Debug)]
pub struct RawSnapshots {
    pub epa: Result<RawTable>,
    pub nhtsa: Result<RawTable>,
    pub doe: Result<RawTable>,
}

/// A dataset that could not be cleaned, and why.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetFailure {
    pub dataset: Dataset,
    pub error: String,
}

/// Outcome of one integration run. Tables whose inputs failed are `None`.
#[derive(Debug, Clone)]
pub struct IntegrationRun {
    pub reference_date: NaiveDate,
    pub epa: Option<CleanedTable<ExplodedVehicleFuelRecord>>,
    pub nhtsa: Option<CleanedTable<ComplaintRecord>>,
    pub doe: Option<CleanedTable<StationRecord>>,
    pub vehicle_complaints: Option<Vec<VehicleComplaintRecord>>,
    pub fuel_infrastructure: Option<Vec<FuelInfrastructureRecord>>,
    pub comprehensive: Option<Vec<ComprehensiveVehicleRecord>>,
    pub failures: Vec<DatasetFailure>,
}

/// Serializable summary written next to the output tables.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub reference_date: NaiveDate,
    pub cleaning: Vec<CleaningReport>,
    pub failures: Vec<DatasetFailure>,
    pub table_rows: BTreeMap<&'static str, usize>,
}

impl IntegrationRun {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn cleaning_reports(&self) -> Vec<&CleaningReport> {
        let mut reports = Vec::new();
        if let Some(table) = &self.epa {
            reports.push(&table.report);
        }
        if let Some(table) = &self.nhtsa {
            reports.push(&table.report);
        }
        if let Some(table) = &self.doe {
            reports.push(&table.report);
        }
        reports
    }

    /// Row counts of every produced table, by table name.
    pub fn table_rows(&self) -> BTreeMap<&'static str, usize> {
        let mut rows = BTreeMap::new();
        if let Some(table) = &self.epa {
            rows.insert(EPA_CLEAN_TABLE, table.len());
        }
        if let Some(table) = &self.nhtsa {
            rows.insert(NHTSA_CLEAN_TABLE, table.len());
        }
        if let Some(table) = &self.doe {
            rows.insert(DOE_CLEAN_TABLE, table.len());
        }
        if let Some(table) = &self.vehicle_complaints {
            rows.insert(VEHICLE_COMPLAINTS_TABLE, table.len());
        }
        if let Some(table) = &self.fuel_infrastructure {
            rows.insert(FUEL_INFRASTRUCTURE_TABLE, table.len());
        }
        if let Some(table) = &self.comprehensive {
            rows.insert(COMPREHENSIVE_TABLE, table.len());
        }
        rows
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            reference_date: self.reference_date,
            cleaning: self.cleaning_reports().into_iter().cloned().collect(),
            failures: self.failures.clone(),
            table_rows: self.table_rows(),
        }
    }
}

/// Cleans the three sources in parallel, waits for all of them, then
/// integrates whatever survived.
pub struct IntegrationOrchestrator {
    max_workers: usize,
    reference: ReferenceDate,
}

impl IntegrationOrchestrator {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            reference: ReferenceDate::default(),
        }
    }

    pub fn with_reference_date(mut self, reference: ReferenceDate) -> Self {
        self.reference = reference;
        self
    }

    pub fn run(&self, inputs: RawSnapshots, progress: Option<&ProgressReporter>) -> Result<IntegrationRun> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        if let Some(p) = progress {
            p.set_message("Cleaning EPA, NHTSA and DOE snapshots...");
        }

        let RawSnapshots { epa, nhtsa, doe } = inputs;
        let reference = self.reference;

        // Barrier: integration starts only after all three pipelines return
        let (epa, (nhtsa, doe)) = pool.install(|| {
            rayon::join(
                || clean_with(EpaPipeline::new(reference), epa),
                || {
                    rayon::join(
                        || clean_with(NhtsaPipeline::new(reference), nhtsa),
                        || clean_with(DoePipeline::new(reference), doe),
                    )
                },
            )
        });

        let mut failures = Vec::new();
        let epa = settle(Dataset::Epa, epa, &mut failures);
        let nhtsa = settle(Dataset::Nhtsa, nhtsa, &mut failures);
        let doe = settle(Dataset::Doe, doe, &mut failures);

        if let Some(p) = progress {
            p.set_message("Integrating datasets...");
        }

        let vehicle_complaints = match (&epa, &nhtsa) {
            (Some(vehicles), Some(complaints)) => {
                let summaries = ComplaintAggregator::aggregate(&complaints.rows);
                Some(JoinEngine::join_complaints(&vehicles.rows, &summaries))
            }
            _ => None,
        };

        let infrastructure = doe.as_ref().map(|stations| InfrastructureAggregator::new(&stations.rows));

        let fuel_infrastructure = match (&epa, &infrastructure) {
            (Some(vehicles), Some(aggregator)) => Some(aggregator.fuel_infrastructure(&vehicles.rows)),
            _ => None,
        };

        let comprehensive = match (&vehicle_complaints, &infrastructure) {
            (Some(analysis), Some(aggregator)) => Some(aggregator.comprehensive(analysis)),
            _ => None,
        };

        let run = IntegrationRun {
            reference_date: self.reference.today(),
            epa,
            nhtsa,
            doe,
            vehicle_complaints,
            fuel_infrastructure,
            comprehensive,
            failures,
        };

        info!(
            tables = run.table_rows().len(),
            failed_datasets = run.failures.len(),
            "integration finished"
        );

        if let Some(p) = progress {
            p.finish_with_message("Integration complete");
        }

        Ok(run)
    }
}

impl Default for IntegrationOrchestrator {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

fn clean_with<P: SourceCleaningPipeline>(
    pipeline: P,
    input: Result<RawTable>,
) -> Result<CleanedTable<P::Output>> {
    pipeline.clean(&input?)
}

fn settle<T>(
    dataset: Dataset,
    result: Result<CleanedTable<T>>,
    failures: &mut Vec<DatasetFailure>,
) -> Option<CleanedTable<T>> {
    match result {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(%dataset, error = %e, "dataset halted");
            failures.push(DatasetFailure {
                dataset,
                error: e.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::NHTSA_COLUMNS;
    use crate::models::RawRecord;

    fn reference() -> ReferenceDate {
        ReferenceDate::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
    }

    fn epa_table() -> RawTable {
        RawTable::from_rows(
            Dataset::Epa,
            &[
                "year", "make", "model", "city08", "highway08", "comb08", "displ", "cylinders",
                "trany", "drive", "fuelType1", "fuelType2",
            ],
            &[
                vec![
                    "2011", "Chevrolet", "Volt", "35", "40", "37", "1.4", "4", "Automatic (S6)",
                    "Front-Wheel Drive", "Premium Gasoline", "Electricity",
                ],
                vec![
                    "2015", "Honda", "Civic", "30", "39", "33", "1.8", "4", "Automatic (AV)",
                    "Front-Wheel Drive", "Regular Gasoline", "",
                ],
            ],
        )
    }

    fn nhtsa_table() -> RawTable {
        let mut table = RawTable::positional(Dataset::Nhtsa, 18, &NHTSA_COLUMNS);
        let mut fields = vec![String::new(); 18];
        fields[0] = "11400001".to_string();
        fields[3] = "CHEVROLET".to_string();
        fields[4] = "VOLT".to_string();
        fields[5] = "2011".to_string();
        fields[6] = "Y".to_string();
        fields[7] = "20220314".to_string();
        table.push(RawRecord::new(fields));
        table
    }

    fn doe_table() -> RawTable {
        RawTable::from_rows(
            Dataset::Doe,
            &["fuel_type_code", "latitude", "longitude", "status_code", "id"],
            &[
                vec!["ELEC", "39.7", "-104.9", "E", "1"],
                vec!["ELEC", "40.7", "-74.0", "P", "2"],
            ],
        )
    }

    fn orchestrator() -> IntegrationOrchestrator {
        IntegrationOrchestrator::new(2).with_reference_date(reference())
    }

    #[test]
    fn test_full_run() {
        let run = orchestrator()
            .run(
                RawSnapshots {
                    epa: Ok(epa_table()),
                    nhtsa: Ok(nhtsa_table()),
                    doe: Ok(doe_table()),
                },
                None,
            )
            .unwrap();

        assert!(run.is_complete());
        assert_eq!(run.table_rows().len(), 6);

        let analysis = run.vehicle_complaints.as_ref().unwrap();
        assert_eq!(analysis.len(), 3);
        assert_eq!(analysis[0].complaints.crash_incidents, 1);
        assert_eq!(analysis[2].complaints.total_complaints, 0);

        let infrastructure = run.fuel_infrastructure.as_ref().unwrap();
        assert_eq!(infrastructure.len(), 1);
        assert_eq!(infrastructure[0].year, 2011);
        assert_eq!(infrastructure[0].vehicles_per_station, Some(1.0));

        let comprehensive = run.comprehensive.as_ref().unwrap();
        assert_eq!(comprehensive[1].stations_nationwide, 2);

        let report = run.report();
        assert_eq!(report.cleaning.len(), 3);
        assert_eq!(report.table_rows.get(VEHICLE_COMPLAINTS_TABLE), Some(&3));
    }

    #[test]
    fn test_failure_halts_only_that_dataset() {
        let broken_doe = RawTable::from_rows(Dataset::Doe, &["latitude"], &[vec!["39.7"]]);

        let run = orchestrator()
            .run(
                RawSnapshots {
                    epa: Ok(epa_table()),
                    nhtsa: Ok(nhtsa_table()),
                    doe: Ok(broken_doe),
                },
                None,
            )
            .unwrap();

        assert!(!run.is_complete());
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].dataset, Dataset::Doe);
        assert!(run.failures[0].error.contains("longitude"));

        assert!(run.epa.is_some());
        assert!(run.vehicle_complaints.is_some());
        assert!(run.doe.is_none());
        assert!(run.fuel_infrastructure.is_none());
        assert!(run.comprehensive.is_none());
    }

    #[test]
    fn test_read_failure_is_recorded() {
        let run = orchestrator()
            .run(
                RawSnapshots {
                    epa: Ok(epa_table()),
                    nhtsa: Err(ProcessingError::InvalidFormat("unreadable".to_string())),
                    doe: Ok(doe_table()),
                },
                None,
            )
            .unwrap();

        assert_eq!(run.failures[0].dataset, Dataset::Nhtsa);
        assert!(run.vehicle_complaints.is_none());
        assert!(run.comprehensive.is_none());
        assert!(run.fuel_infrastructure.is_some());
    }
}

use chrono::Datelike;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use validator::Validate;

use crate::models::{ExplodedVehicleFuelRecord, VehicleComplaintRecord};
use crate::processors::deduplicator::DedupKey;
use crate::processors::orchestrator::IntegrationRun;
use crate::utils::constants::{
    COMPREHENSIVE_TABLE, DEFAULT_MIN_COMPREHENSIVE_ROWS, DOE_CLEAN_TABLE, DEFAULT_MIN_INFRASTRUCTURE_ROWS,
    DEFAULT_MIN_VEHICLE_ROWS, EPA_CLEAN_TABLE, FUEL_INFRASTRUCTURE_TABLE, MIN_MODEL_YEAR,
    NHTSA_CLEAN_TABLE, VEHICLE_COMPLAINTS_TABLE,
};

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub tables_checked: usize,
    pub table_rows: BTreeMap<&'static str, usize>,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub table: &'static str,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    TooFewRows,
    YearOutOfRange,
    NonPositiveMpg,
    MissingKeyField,
    MileageWithoutComplaints,
    DuplicateKey,
    FuelRankMismatch,
    InvalidRecord,
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationType::TooFewRows => "too few rows",
            ViolationType::YearOutOfRange => "year out of range",
            ViolationType::NonPositiveMpg => "non-positive MPG",
            ViolationType::MissingKeyField => "missing key field",
            ViolationType::MileageWithoutComplaints => "mileage without complaints",
            ViolationType::DuplicateKey => "duplicate key",
            ViolationType::FuelRankMismatch => "fuel rank mismatch",
            ViolationType::InvalidRecord => "invalid record",
        };
        write!(f, "{}", name)
    }
}

/// Post-run sanity checks. Violations are reported, never fatal.
pub struct IntegrityChecker {
    min_vehicle_rows: usize,
    min_infrastructure_rows: usize,
    min_comprehensive_rows: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            min_vehicle_rows: DEFAULT_MIN_VEHICLE_ROWS,
            min_infrastructure_rows: DEFAULT_MIN_INFRASTRUCTURE_ROWS,
            min_comprehensive_rows: DEFAULT_MIN_COMPREHENSIVE_ROWS,
        }
    }

    /// Minimum row expectations for the three integrated tables.
    pub fn with_min_rows(mut self, vehicle: usize, infrastructure: usize, comprehensive: usize) -> Self {
        self.min_vehicle_rows = vehicle;
        self.min_infrastructure_rows = infrastructure;
        self.min_comprehensive_rows = comprehensive;
        self
    }

    pub fn check_integrity(&self, run: &IntegrationRun) -> IntegrityReport {
        let mut report = IntegrityReport {
            tables_checked: 0,
            table_rows: run.table_rows(),
            violations: Vec::new(),
        };
        let current_year = run.reference_date.year();

        if let Some(epa) = &run.epa {
            report.tables_checked += 1;
            self.check_vehicle_fuels(&epa.rows, &mut report);
        }

        if let Some(nhtsa) = &run.nhtsa {
            report.tables_checked += 1;
            let mut seen = HashSet::with_capacity(nhtsa.rows.len());
            for complaint in &nhtsa.rows {
                self.check_record(NHTSA_CLEAN_TABLE, &complaint.complaint_id, complaint, &mut report);
                if !seen.insert(complaint.complaint_id.as_str()) {
                    report.violations.push(Violation {
                        table: NHTSA_CLEAN_TABLE,
                        violation_type: ViolationType::DuplicateKey,
                        details: format!("complaint {} appears more than once", complaint.complaint_id),
                    });
                }
            }
        }

        if let Some(doe) = &run.doe {
            report.tables_checked += 1;
            for station in &doe.rows {
                let label = station.station_id.as_deref().unwrap_or("station without id");
                self.check_record(DOE_CLEAN_TABLE, label, station, &mut report);
            }
        }

        if let Some(analysis) = &run.vehicle_complaints {
            report.tables_checked += 1;
            self.check_min_rows(VEHICLE_COMPLAINTS_TABLE, analysis.len(), self.min_vehicle_rows, &mut report);
            for row in analysis {
                self.check_analysis_row(row, current_year, &mut report);
            }
        }

        if let Some(infrastructure) = &run.fuel_infrastructure {
            report.tables_checked += 1;
            self.check_min_rows(
                FUEL_INFRASTRUCTURE_TABLE,
                infrastructure.len(),
                self.min_infrastructure_rows,
                &mut report,
            );
        }

        if let Some(comprehensive) = &run.comprehensive {
            report.tables_checked += 1;
            self.check_min_rows(
                COMPREHENSIVE_TABLE,
                comprehensive.len(),
                self.min_comprehensive_rows,
                &mut report,
            );
        }

        report
    }

    fn check_min_rows(&self, table: &'static str, rows: usize, minimum: usize, report: &mut IntegrityReport) {
        if rows < minimum {
            report.violations.push(Violation {
                table,
                violation_type: ViolationType::TooFewRows,
                details: format!("{} rows, expected at least {}", rows, minimum),
            });
        }
    }

    /// Re-runs the field rules declared on the cleaned record types.
    fn check_record(
        &self,
        table: &'static str,
        label: impl fmt::Display,
        record: &impl Validate,
        report: &mut IntegrityReport,
    ) {
        if let Err(errors) = record.validate() {
            report.violations.push(Violation {
                table,
                violation_type: ViolationType::InvalidRecord,
                details: format!("{}: {}", label, errors),
            });
        }
    }

    /// Dedup keys unique per vehicle; one rank-1 row per vehicle, followed by
    /// a rank-2 row exactly when it has a secondary fuel.
    fn check_vehicle_fuels(&self, rows: &[ExplodedVehicleFuelRecord], report: &mut IntegrityReport) {
        let mut keys = HashSet::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let previous = index.checked_sub(1).map(|i| &rows[i]);
            let next = rows.get(index + 1);

            let consistent = match row.fuel_rank {
                1 => {
                    let label = format!("{} {} {}", row.vehicle.year, row.vehicle.make, row.vehicle.model);
                    self.check_record(EPA_CLEAN_TABLE, label, &row.vehicle, report);
                    if !keys.insert(row.vehicle.dedup_key()) {
                        report.violations.push(Violation {
                            table: EPA_CLEAN_TABLE,
                            violation_type: ViolationType::DuplicateKey,
                            details: format!(
                                "{} {} {} listed more than once",
                                row.vehicle.year, row.vehicle.make, row.vehicle.model
                            ),
                        });
                    }
                    let has_secondary_row =
                        next.is_some_and(|n| n.fuel_rank == 2 && n.vehicle == row.vehicle);
                    row.fuel_used == row.vehicle.primary_fuel
                        && has_secondary_row == row.vehicle.is_dual_fuel()
                }
                2 => {
                    previous.is_some_and(|p| p.fuel_rank == 1 && p.vehicle == row.vehicle)
                        && row.vehicle.secondary_fuel.as_deref() == Some(row.fuel_used.as_str())
                }
                _ => false,
            };

            if !consistent {
                report.violations.push(Violation {
                    table: EPA_CLEAN_TABLE,
                    violation_type: ViolationType::FuelRankMismatch,
                    details: format!(
                        "row {}: {} {} {} fuel '{}' rank {}",
                        index,
                        row.vehicle.year,
                        row.vehicle.make,
                        row.vehicle.model,
                        row.fuel_used,
                        row.fuel_rank
                    ),
                });
            }
        }
    }

    fn check_analysis_row(&self, row: &VehicleComplaintRecord, current_year: i32, report: &mut IntegrityReport) {
        let vehicle = &row.vehicle.vehicle;
        let mut flag = |violation_type: ViolationType, details: String| {
            report.violations.push(Violation {
                table: VEHICLE_COMPLAINTS_TABLE,
                violation_type,
                details,
            });
        };

        if !(MIN_MODEL_YEAR..=current_year).contains(&vehicle.year) {
            flag(
                ViolationType::YearOutOfRange,
                format!("year {} outside [{}, {}]", vehicle.year, MIN_MODEL_YEAR, current_year),
            );
        }

        if let Some(mpg) = vehicle.combined_mpg.filter(|mpg| *mpg <= 0.0) {
            flag(
                ViolationType::NonPositiveMpg,
                format!("{} {} {} combined MPG {}", vehicle.year, vehicle.make, vehicle.model, mpg),
            );
        }

        if vehicle.make.trim().is_empty() || vehicle.model.trim().is_empty() {
            flag(
                ViolationType::MissingKeyField,
                format!("year {} has an empty make or model", vehicle.year),
            );
        }

        if row.complaints.total_complaints == 0 && row.complaints.avg_complaint_mileage.is_some() {
            flag(
                ViolationType::MileageWithoutComplaints,
                format!("{} {} {} has mileage but no complaints", vehicle.year, vehicle.make, vehicle.model),
            );
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Tables Checked: {}\n", report.tables_checked));
        for (table, rows) in &report.table_rows {
            summary.push_str(&format!("  {}: {} rows\n", table, rows));
        }
        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. [{}] {}: {}\n",
                    i + 1,
                    violation.table,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::fixtures::complaint;
    use crate::models::station::fixtures::station;
    use crate::models::vehicle::fixtures::{vehicle, volt};
    use crate::models::{ComplaintMetrics, ComplaintRecord, FuelTypeCode, StationStatus};
    use crate::processors::cleaning::CleanedTable;
    use crate::processors::report::CleaningReport;
    use crate::processors::row_exploder::RowExploder;
    use crate::models::Dataset;
    use chrono::NaiveDate;

    fn run_with(
        exploded: Vec<ExplodedVehicleFuelRecord>,
        complaints: Vec<ComplaintRecord>,
    ) -> IntegrationRun {
        let analysis = exploded
            .iter()
            .cloned()
            .map(|vehicle| VehicleComplaintRecord {
                vehicle,
                complaints: ComplaintMetrics::NO_COMPLAINTS,
                vehicle_variants: 1,
            })
            .collect();

        IntegrationRun {
            reference_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            epa: Some(CleanedTable {
                report: CleaningReport::new(Dataset::Epa, exploded.len()),
                rows: exploded,
            }),
            nhtsa: Some(CleanedTable {
                report: CleaningReport::new(Dataset::Nhtsa, complaints.len()),
                rows: complaints,
            }),
            doe: None,
            vehicle_complaints: Some(analysis),
            fuel_infrastructure: None,
            comprehensive: None,
            failures: Vec::new(),
        }
    }

    fn checker() -> IntegrityChecker {
        IntegrityChecker::new().with_min_rows(1, 1, 1)
    }

    #[test]
    fn test_clean_run_has_no_violations() {
        let (rows, _) = RowExploder::apply(vec![volt(), vehicle(2015, "Honda", "Civic", "Regular Gasoline")]);
        let run = run_with(rows, vec![complaint("1", 2011, "CHEVROLET", "VOLT")]);

        let report = checker().check_integrity(&run);
        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.tables_checked, 3);
    }

    #[test]
    fn test_detects_broken_invariants() {
        let (mut rows, _) = RowExploder::apply(vec![volt(), volt()]);
        // Lose the secondary row of the second Volt
        rows.pop();
        for row in rows.iter_mut() {
            row.vehicle.combined_mpg = Some(0.0);
        }

        let run = run_with(
            rows,
            vec![complaint("1", 2011, "CHEVROLET", "VOLT"), complaint("1", 2011, "CHEVROLET", "VOLT")],
        );

        let report = checker().check_integrity(&run);
        assert_eq!(report.count(ViolationType::FuelRankMismatch), 1);
        assert_eq!(report.count(ViolationType::DuplicateKey), 2);
        assert_eq!(report.count(ViolationType::NonPositiveMpg), 3);
    }

    #[test]
    fn test_invalid_cleaned_records_are_reported() {
        let mut old = vehicle(2015, "Honda", "Civic", "Regular Gasoline");
        old.year = 2005;
        let (rows, _) = RowExploder::apply(vec![volt(), old]);

        let mut far = complaint("2", 2011, "CHEVROLET", "VOLT");
        far.mileage = Some(2_500_000.0);
        let mut run = run_with(rows, vec![complaint("1", 2011, "CHEVROLET", "VOLT"), far]);

        let mut offshore = station("7", FuelTypeCode::Elec, StationStatus::Available);
        offshore.latitude = 80.0;
        run.doe = Some(CleanedTable {
            report: CleaningReport::new(Dataset::Doe, 2),
            rows: vec![station("6", FuelTypeCode::Cng, StationStatus::Planned), offshore],
        });

        let report = checker().check_integrity(&run);
        assert_eq!(report.tables_checked, 4);
        assert_eq!(report.count(ViolationType::InvalidRecord), 3);

        let tables: Vec<&str> = report
            .violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::InvalidRecord)
            .map(|v| v.table)
            .collect();
        assert_eq!(tables, vec![EPA_CLEAN_TABLE, NHTSA_CLEAN_TABLE, DOE_CLEAN_TABLE]);
    }

    #[test]
    fn test_row_minimums_and_summary() {
        let (rows, _) = RowExploder::apply(vec![vehicle(2026, "Honda", "Civic", "Regular Gasoline")]);
        let run = run_with(rows, Vec::new());

        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&run);
        assert_eq!(report.count(ViolationType::TooFewRows), 1);
        assert_eq!(report.count(ViolationType::YearOutOfRange), 1);

        let summary = checker.generate_summary(&report);
        assert!(summary.contains("=== Integrity Check Report ==="));
        assert!(summary.contains("too few rows"));
        assert!(summary.contains("vehicle_complaints_analysis: 1 rows"));
    }
}

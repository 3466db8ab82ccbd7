//! Vehicle supply versus refuelling infrastructure.
//!
//! EPA fuel names are mapped onto DOE fuel codes through a fixed dictionary.
//! The station snapshot carries no model year, so the same station counts are
//! broadcast to every model year of a fuel code.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::models::{
    ComprehensiveVehicleRecord, ExplodedVehicleFuelRecord, FuelInfrastructureRecord, FuelTypeCode,
    StationRecord, VehicleComplaintRecord,
};

/// EPA `fuel_used` values with a DOE station counterpart. Anything else
/// (gasoline, premium, LPG, ...) has no dedicated infrastructure.
const FUEL_DICTIONARY: [(&str, FuelTypeCode); 9] = [
    ("Electricity", FuelTypeCode::Elec),
    ("E85", FuelTypeCode::E85),
    ("Gasoline or E85", FuelTypeCode::E85),
    ("Natural Gas", FuelTypeCode::Cng),
    ("CNG", FuelTypeCode::Cng),
    ("Gasoline or natural gas", FuelTypeCode::Cng),
    ("Diesel", FuelTypeCode::Bd),
    ("Hydrogen", FuelTypeCode::Hy),
    ("LNG", FuelTypeCode::Lng),
];

pub fn station_fuel_code(fuel_used: &str) -> Option<FuelTypeCode> {
    FUEL_DICTIONARY
        .iter()
        .find(|(name, _)| *name == fuel_used)
        .map(|(_, code)| *code)
}

/// One-decimal rounding, ties to even.
fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationCounts {
    pub total: u64,
    pub available: u64,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| round1(self.sum / self.count as f64))
    }
}

#[derive(Default)]
struct FuelGroup {
    vehicle_count: u64,
    combined: Mean,
    city: Mean,
    highway: Mean,
}

pub struct InfrastructureAggregator {
    stations: BTreeMap<FuelTypeCode, StationCounts>,
}

impl InfrastructureAggregator {
    pub fn new(stations: &[StationRecord]) -> Self {
        let mut counts: BTreeMap<FuelTypeCode, StationCounts> = BTreeMap::new();

        for station in stations {
            let entry = counts.entry(station.fuel_type_code).or_default();
            entry.total += 1;
            if station.is_available() {
                entry.available += 1;
            }
        }

        debug!(?counts, "station counts by fuel code");
        Self { stations: counts }
    }

    pub fn station_counts(&self, code: FuelTypeCode) -> StationCounts {
        self.stations.get(&code).copied().unwrap_or_default()
    }

    /// Group vehicle-fuel rows by (year, fuel code) and attach station counts.
    pub fn fuel_infrastructure(
        &self,
        vehicles: &[ExplodedVehicleFuelRecord],
    ) -> Vec<FuelInfrastructureRecord> {
        let mut groups: BTreeMap<(i32, FuelTypeCode), FuelGroup> = BTreeMap::new();
        let mut unmapped = 0usize;

        for row in vehicles {
            let Some(code) = station_fuel_code(&row.fuel_used) else {
                unmapped += 1;
                continue;
            };

            let group = groups.entry((row.vehicle.year, code)).or_default();
            group.vehicle_count += 1;
            group.combined.add(row.vehicle.combined_mpg);
            group.city.add(row.vehicle.city_mpg);
            group.highway.add(row.vehicle.highway_mpg);
        }

        let records: Vec<FuelInfrastructureRecord> = groups
            .into_iter()
            .map(|((year, fuel_type_code), group)| {
                let counts = self.station_counts(fuel_type_code);
                let vehicles_per_station = (counts.available > 0)
                    .then(|| round1(group.vehicle_count as f64 / counts.available as f64));

                FuelInfrastructureRecord {
                    year,
                    fuel_type_code,
                    vehicle_count: group.vehicle_count,
                    avg_combined_mpg: group.combined.value(),
                    avg_city_mpg: group.city.value(),
                    avg_highway_mpg: group.highway.value(),
                    total_stations: counts.total,
                    available_stations: counts.available,
                    vehicles_per_station,
                }
            })
            .collect();

        info!(
            groups = records.len(),
            unmapped_rows = unmapped,
            "fuel infrastructure aggregated"
        );
        records
    }

    /// Attach the nationwide station count of each row's fuel code.
    pub fn comprehensive(
        &self,
        analysis: &[VehicleComplaintRecord],
    ) -> Vec<ComprehensiveVehicleRecord> {
        analysis
            .iter()
            .map(|row| {
                let fuel_type_code = station_fuel_code(&row.vehicle.fuel_used);
                let stations_nationwide = fuel_type_code
                    .map(|code| self.station_counts(code).total)
                    .unwrap_or(0);

                ComprehensiveVehicleRecord {
                    analysis: row.clone(),
                    fuel_type_code,
                    stations_nationwide,
                }
            })
            .collect()
    }
}

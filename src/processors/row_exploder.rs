use std::iter::{Chain, Once};

use crate::models::{CleanedVehicleRecord, ExplodedVehicleFuelRecord};
use crate::processors::report::{Stage, StageReport};

/// The one or two fuel rows a vehicle expands into.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelExpansion {
    pub primary: ExplodedVehicleFuelRecord,
    pub secondary: Option<ExplodedVehicleFuelRecord>,
}

impl FuelExpansion {
    pub fn of(vehicle: CleanedVehicleRecord) -> Self {
        let secondary = vehicle
            .secondary_fuel
            .clone()
            .map(|fuel_used| ExplodedVehicleFuelRecord {
                vehicle: vehicle.clone(),
                fuel_used,
                fuel_rank: 2,
            });

        let primary = ExplodedVehicleFuelRecord {
            fuel_used: vehicle.primary_fuel.clone(),
            vehicle,
            fuel_rank: 1,
        };

        Self { primary, secondary }
    }

    pub fn len(&self) -> usize {
        1 + usize::from(self.secondary.is_some())
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl IntoIterator for FuelExpansion {
    type Item = ExplodedVehicleFuelRecord;
    type IntoIter = Chain<Once<ExplodedVehicleFuelRecord>, std::option::IntoIter<ExplodedVehicleFuelRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.primary).chain(self.secondary)
    }
}

pub struct RowExploder;

impl RowExploder {
    /// Fan every vehicle out to its fuels; a vehicle's rows stay adjacent.
    pub fn apply(vehicles: Vec<CleanedVehicleRecord>) -> (Vec<ExplodedVehicleFuelRecord>, StageReport) {
        let report = StageReport::new(Stage::Explosion, vehicles.len());

        let exploded: Vec<ExplodedVehicleFuelRecord> =
            vehicles.into_iter().flat_map(FuelExpansion::of).collect();

        let rows_out = exploded.len();
        (exploded, report.finish(rows_out))
    }
}

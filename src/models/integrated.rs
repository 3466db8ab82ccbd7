use serde::{Deserialize, Serialize};

use crate::models::{ComplaintSummary, ExplodedVehicleFuelRecord, FuelTypeCode};

/// Complaint-derived columns attached to every vehicle-fuel row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintMetrics {
    pub total_complaints: u64,
    pub crash_incidents: u64,
    pub fire_incidents: u64,
    pub total_injured: i64,
    pub total_deaths: i64,
    pub avg_complaint_mileage: Option<f64>,
}

impl ComplaintMetrics {
    /// Zero-fill policy: a vehicle with no complaint summary is read as
    /// "zero complaints observed". The average stays null because there is
    /// nothing to average.
    pub const NO_COMPLAINTS: ComplaintMetrics = ComplaintMetrics {
        total_complaints: 0,
        crash_incidents: 0,
        fire_incidents: 0,
        total_injured: 0,
        total_deaths: 0,
        avg_complaint_mileage: None,
    };
}

impl From<&ComplaintSummary> for ComplaintMetrics {
    fn from(summary: &ComplaintSummary) -> Self {
        Self {
            total_complaints: summary.total_complaints,
            crash_incidents: summary.crash_incidents,
            fire_incidents: summary.fire_incidents,
            total_injured: summary.total_injured,
            total_deaths: summary.total_deaths,
            avg_complaint_mileage: summary.avg_complaint_mileage,
        }
    }
}

/// Row of `vehicle_complaints_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleComplaintRecord {
    pub vehicle: ExplodedVehicleFuelRecord,
    pub complaints: ComplaintMetrics,
    /// EPA vehicle-fuel rows sharing this row's join key, itself included
    pub vehicle_variants: u64,
}

/// Row of `fuel_infrastructure_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelInfrastructureRecord {
    pub year: i32,
    pub fuel_type_code: FuelTypeCode,
    pub vehicle_count: u64,
    pub avg_combined_mpg: Option<f64>,
    pub avg_city_mpg: Option<f64>,
    pub avg_highway_mpg: Option<f64>,
    pub total_stations: u64,
    pub available_stations: u64,
    /// `None` when no station of this fuel type is available
    pub vehicles_per_station: Option<f64>,
}

/// Row of `comprehensive_vehicle_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveVehicleRecord {
    pub analysis: VehicleComplaintRecord,
    pub fuel_type_code: Option<FuelTypeCode>,
    pub stations_nationwide: u64,
}

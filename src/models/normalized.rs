//! Stage schemas between raw text and cleaned records.
//!
//! Every field is optional here: normalization never rejects a row, it only
//! nulls what it cannot read. The critical-field check turns these into the
//! strongly typed records.

use chrono::NaiveDate;
use validator::Validate;

use crate::models::{FuelTypeCode, StationRecord, StationStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedVehicleRow {
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub vehicle_class: Option<String>,
    pub drive: Option<String>,
    pub transmission: Option<String>,
    pub cylinders: Option<f64>,
    pub displacement: Option<f64>,
    pub primary_fuel: Option<String>,
    pub secondary_fuel: Option<String>,
    pub city_mpg: Option<f64>,
    pub highway_mpg: Option<f64>,
    pub combined_mpg: Option<f64>,
    pub co2_g_per_mile: Option<f64>,
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedComplaintRow {
    pub complaint_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub component: Option<String>,
    pub crash: bool,
    pub fire: bool,
    pub injured: Option<i64>,
    pub deaths: Option<i64>,
    pub mileage: Option<f64>,
    pub manufacturer: Option<String>,
    pub cmpl_id: Option<String>,
    pub vin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedStationRow {
    pub station_id: Option<String>,
    /// Uppercased code as published; may be outside the alternative-fuel set
    pub fuel_type_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status_code: Option<StationStatus>,
    pub access_code: Option<String>,
    pub open_date: Option<NaiveDate>,
    pub station_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub ev_network: Option<String>,
    pub ev_connector_types: Option<String>,
    pub ev_pricing: Option<String>,
}

/// A station that passed the critical-field check but whose fuel code has not
/// yet been matched against the alternative-fuel set.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct StationCandidate {
    pub station_id: Option<String>,
    pub fuel_type_code: String,

    #[validate(range(min = 18.0, max = 72.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = -65.0))]
    pub longitude: f64,

    pub status_code: StationStatus,
    pub access_code: Option<String>,
    pub open_date: Option<NaiveDate>,
    pub station_name: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub ev_network: Option<String>,
    pub ev_connector_types: Option<String>,
    pub ev_pricing: Option<String>,
}

impl StationCandidate {
    /// `None` for fuel codes outside the alternative-fuel set.
    pub fn into_station(self) -> Option<StationRecord> {
        let fuel_type_code = FuelTypeCode::parse(&self.fuel_type_code)?;

        Some(StationRecord {
            station_id: self.station_id,
            fuel_type_code,
            latitude: self.latitude,
            longitude: self.longitude,
            status_code: self.status_code,
            access_code: self.access_code,
            open_date: self.open_date,
            station_name: self.station_name,
            street_address: self.street_address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            ev_network: self.ev_network,
            ev_connector_types: self.ev_connector_types,
            ev_pricing: self.ev_pricing,
        })
    }
}

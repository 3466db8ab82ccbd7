use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// DOE fuel codes kept by the cleaning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FuelTypeCode {
    Elec,
    Lng,
    Cng,
    Bd,
    E85,
    Hy,
}

impl FuelTypeCode {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "ELEC" => Some(FuelTypeCode::Elec),
            "LNG" => Some(FuelTypeCode::Lng),
            "CNG" => Some(FuelTypeCode::Cng),
            "BD" => Some(FuelTypeCode::Bd),
            "E85" => Some(FuelTypeCode::E85),
            "HY" => Some(FuelTypeCode::Hy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelTypeCode::Elec => "ELEC",
            FuelTypeCode::Lng => "LNG",
            FuelTypeCode::Cng => "CNG",
            FuelTypeCode::Bd => "BD",
            FuelTypeCode::E85 => "E85",
            FuelTypeCode::Hy => "HY",
        }
    }
}

impl fmt::Display for FuelTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationStatus {
    /// E: open and available
    Available,
    /// P: planned
    Planned,
    /// T: temporarily unavailable
    TemporarilyUnavailable,
}

impl StationStatus {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "E" => Some(StationStatus::Available),
            "P" => Some(StationStatus::Planned),
            "T" => Some(StationStatus::TemporarilyUnavailable),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            StationStatus::Available => "E",
            StationStatus::Planned => "P",
            StationStatus::TemporarilyUnavailable => "T",
        }
    }
}

/// One DOE fuel station after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    pub station_id: Option<String>,
    pub fuel_type_code: FuelTypeCode,

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

impl StationRecord {
    pub fn is_available(&self) -> bool {
        self.status_code == StationStatus::Available
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::ELECTRIC_FUEL_MARKER;

/// One EPA vehicle configuration after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CleanedVehicleRecord {
    #[validate(range(min = 2010))]
    pub year: i32,

    #[validate(length(min = 1))]
    pub make: String,

    #[validate(length(min = 1))]
    pub model: String,

    pub vehicle_class: String,
    pub drive: String,
    pub transmission: String,
    pub cylinders: Option<f64>,
    pub displacement: Option<f64>,
    pub primary_fuel: String,
    pub secondary_fuel: Option<String>,
    pub city_mpg: Option<f64>,
    pub highway_mpg: Option<f64>,
    pub combined_mpg: Option<f64>,
    pub co2_g_per_mile: Option<f64>,
    pub source_id: Option<String>,
}

impl CleanedVehicleRecord {
    /// Present MPG ratings in (combined, city, highway) order.
    pub fn mpg_values(&self) -> impl Iterator<Item = f64> {
        [self.combined_mpg, self.city_mpg, self.highway_mpg]
            .into_iter()
            .flatten()
    }

    pub fn has_mpg(&self) -> bool {
        self.mpg_values().next().is_some()
    }

    /// MPGe ratings are legitimate for anything running on electricity.
    pub fn is_electric(&self) -> bool {
        let mentions_electric =
            |fuel: &str| fuel.to_lowercase().contains(ELECTRIC_FUEL_MARKER);

        mentions_electric(&self.primary_fuel)
            || self.secondary_fuel.as_deref().is_some_and(mentions_electric)
    }

    pub fn is_dual_fuel(&self) -> bool {
        self.secondary_fuel.is_some()
    }
}

/// A vehicle paired with one of the fuels it can run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplodedVehicleFuelRecord {
    pub vehicle: CleanedVehicleRecord,
    pub fuel_used: String,
    /// 1 for the primary fuel, 2 for the secondary fuel
    pub fuel_rank: u8,
}

impl ExplodedVehicleFuelRecord {
    pub fn is_primary(&self) -> bool {
        self.fuel_rank == 1
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{vehicle, volt};
    use super::*;

    #[test]
    fn test_vehicle_validation() {
        let record = vehicle(2015, "Toyota", "Prius", "Regular Gasoline");
        assert!(record.validate().is_ok());

        let too_old = vehicle(2008, "Toyota", "Prius", "Regular Gasoline");
        assert!(too_old.validate().is_err());

        let no_make = vehicle(2015, "", "Prius", "Regular Gasoline");
        assert!(no_make.validate().is_err());
    }

    #[test]
    fn test_electric_detection() {
        assert!(volt().is_electric());
        assert!(vehicle(2020, "Tesla", "Model 3", "Electricity").is_electric());
        assert!(!vehicle(2020, "Honda", "Civic", "Regular Gasoline").is_electric());
    }

    #[test]
    fn test_mpg_presence() {
        let mut record = vehicle(2015, "Toyota", "Prius", "Regular Gasoline");
        assert!(record.has_mpg());

        record.city_mpg = None;
        record.highway_mpg = None;
        record.combined_mpg = None;
        assert!(!record.has_mpg());
    }
}

use tracing::debug;

use crate::models::{
    CleanedVehicleRecord, ComplaintRecord, Dataset, NormalizedComplaintRow, NormalizedStationRow,
    NormalizedVehicleRow, StationCandidate,
};
use crate::processors::report::{Stage, StageReport};

/// Required-field contract of a normalized row.
pub trait CriticalFields {
    type Valid;

    const DATASET: Dataset;

    /// Fields that must be non-null, in the order they are checked.
    const REQUIRED: &'static [&'static str];

    /// The typed record, or the first required field found null.
    fn into_valid(self) -> Result<Self::Valid, &'static str>;
}

pub struct CriticalFieldValidator;

impl CriticalFieldValidator {
    /// Keep rows whose required fields are all present; count the rest by field.
    pub fn apply<R: CriticalFields>(rows: Vec<R>) -> (Vec<R::Valid>, StageReport) {
        let mut report = StageReport::new(Stage::CriticalFields, rows.len());
        let mut kept = Vec::with_capacity(rows.len());

        for row in rows {
            match row.into_valid() {
                Ok(valid) => kept.push(valid),
                Err(field) => report.record_drop(format!("missing_{}", field)),
            }
        }

        debug!(
            dataset = %R::DATASET,
            dropped = report.rows_in - kept.len(),
            "critical field check"
        );

        let rows_out = kept.len();
        (kept, report.finish(rows_out))
    }
}

impl CriticalFields for NormalizedVehicleRow {
    type Valid = CleanedVehicleRecord;

    const DATASET: Dataset = Dataset::Epa;
    const REQUIRED: &'static [&'static str] = &["year", "make", "model", "mpg"];

    fn into_valid(self) -> Result<CleanedVehicleRecord, &'static str> {
        let year = self.year.ok_or("year")?;
        let make = self.make.ok_or("make")?;
        let model = self.model.ok_or("model")?;

        if self.combined_mpg.is_none() && self.city_mpg.is_none() && self.highway_mpg.is_none() {
            return Err("mpg");
        }

        Ok(CleanedVehicleRecord {
            year,
            make,
            model,
            vehicle_class: self.vehicle_class.unwrap_or_default(),
            drive: self.drive.unwrap_or_default(),
            transmission: self.transmission.unwrap_or_default(),
            cylinders: self.cylinders,
            displacement: self.displacement,
            primary_fuel: self.primary_fuel.unwrap_or_default(),
            secondary_fuel: self.secondary_fuel,
            city_mpg: self.city_mpg,
            highway_mpg: self.highway_mpg,
            combined_mpg: self.combined_mpg,
            co2_g_per_mile: self.co2_g_per_mile,
            source_id: self.source_id,
        })
    }
}

impl CriticalFields for NormalizedComplaintRow {
    type Valid = ComplaintRecord;

    const DATASET: Dataset = Dataset::Nhtsa;
    const REQUIRED: &'static [&'static str] = &["complaint_id", "date", "year", "make", "model"];

    fn into_valid(self) -> Result<ComplaintRecord, &'static str> {
        Ok(ComplaintRecord {
            complaint_id: self.complaint_id.ok_or("complaint_id")?,
            date: self.date.ok_or("date")?,
            year: self.year.ok_or("year")?,
            make: self.make.ok_or("make")?,
            model: self.model.ok_or("model")?,
            component: self.component,
            crash: self.crash,
            fire: self.fire,
            injured: self.injured,
            deaths: self.deaths,
            mileage: self.mileage,
            manufacturer: self.manufacturer,
            cmpl_id: self.cmpl_id,
            vin: self.vin,
        })
    }
}

impl CriticalFields for NormalizedStationRow {
    type Valid = StationCandidate;

    const DATASET: Dataset = Dataset::Doe;
    const REQUIRED: &'static [&'static str] =
        &["latitude", "longitude", "fuel_type_code", "status_code"];

    fn into_valid(self) -> Result<StationCandidate, &'static str> {
        Ok(StationCandidate {
            latitude: self.latitude.ok_or("latitude")?,
            longitude: self.longitude.ok_or("longitude")?,
            fuel_type_code: self.fuel_type_code.ok_or("fuel_type_code")?,
            status_code: self.status_code.ok_or("status_code")?,
            station_id: self.station_id,
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

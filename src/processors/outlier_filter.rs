use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;
use validator::Validate;

use crate::models::{CleanedVehicleRecord, ComplaintRecord, StationCandidate};
use crate::processors::report::{Stage, StageReport};
use crate::utils::constants::{MAX_COMPLAINT_MILEAGE, MAX_NON_ELECTRIC_MPG};

/// The "today" every date and model-year rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate {
    today: NaiveDate,
}

impl ReferenceDate {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_year(&self) -> i32 {
        self.today.year()
    }
}

impl Default for ReferenceDate {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

/// Fixed-threshold rejection rules of one record type.
pub trait OutlierRules {
    /// Name of the first rule the record breaks, if any.
    fn outlier(&self, reference: &ReferenceDate) -> Option<&'static str>;
}

impl OutlierRules for CleanedVehicleRecord {
    fn outlier(&self, reference: &ReferenceDate) -> Option<&'static str> {
        if self.mpg_values().any(|mpg| mpg == 0.0) {
            return Some("zero_mpg");
        }

        if !self.is_electric() && self.mpg_values().any(|mpg| mpg > MAX_NON_ELECTRIC_MPG) {
            return Some("mpg_above_limit");
        }

        if self.year > reference.current_year() {
            return Some("future_model_year");
        }

        None
    }
}

impl OutlierRules for ComplaintRecord {
    fn outlier(&self, reference: &ReferenceDate) -> Option<&'static str> {
        if self.date > reference.today() {
            return Some("future_date");
        }

        if self.mileage.is_some_and(|miles| miles > MAX_COMPLAINT_MILEAGE) {
            return Some("mileage_above_limit");
        }

        if self.year > reference.current_year() {
            return Some("future_model_year");
        }

        None
    }
}

impl OutlierRules for StationCandidate {
    fn outlier(&self, _reference: &ReferenceDate) -> Option<&'static str> {
        if self.latitude == 0.0 && self.longitude == 0.0 {
            return Some("zero_coordinates");
        }

        // Latitude/longitude ranges are declared on the struct
        if self.validate().is_err() {
            return Some("outside_us_bounds");
        }

        None
    }
}

pub struct OutlierFilter {
    reference: ReferenceDate,
}

impl OutlierFilter {
    pub fn new(reference: ReferenceDate) -> Self {
        Self { reference }
    }

    pub fn apply<R: OutlierRules>(&self, rows: Vec<R>) -> (Vec<R>, StageReport) {
        let mut report = StageReport::new(Stage::Outliers, rows.len());

        let kept: Vec<R> = rows
            .into_iter()
            .filter(|row| match row.outlier(&self.reference) {
                Some(rule) => {
                    report.record_drop(rule);
                    false
                }
                None => true,
            })
            .collect();

        debug!(rules = ?report.drop_reasons, "outlier filter");

        let rows_out = kept.len();
        (kept, report.finish(rows_out))
    }
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(ReferenceDate::default())
    }
}

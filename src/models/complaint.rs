use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::JoinKey;

/// One NHTSA safety complaint after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ComplaintRecord {
    /// ODI number, unique after deduplication
    #[validate(length(min = 1))]
    pub complaint_id: String,
    pub date: NaiveDate,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub component: Option<String>,
    pub crash: bool,
    pub fire: bool,
    pub injured: Option<i64>,
    pub deaths: Option<i64>,

    #[validate(range(min = 0.0, max = 1_000_000.0))]
    pub mileage: Option<f64>,

    pub manufacturer: Option<String>,
    pub cmpl_id: Option<String>,
    pub vin: Option<String>,
}

/// Complaint totals for one normalized (year, make, model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintSummary {
    pub key: JoinKey,
    pub total_complaints: u64,
    pub crash_incidents: u64,
    pub fire_incidents: u64,
    pub total_injured: i64,
    pub total_deaths: i64,
    /// Mean over complaints that reported mileage; `None` when none did
    pub avg_complaint_mileage: Option<f64>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::complaint;
    use super::*;

    #[test]
    fn test_mileage_bounds() {
        let mut record = complaint("11400001", 2011, "CHEVROLET", "VOLT");
        assert!(record.validate().is_ok());

        record.mileage = Some(1_000_000.0);
        assert!(record.validate().is_ok());

        record.mileage = Some(1_000_001.0);
        assert!(record.validate().is_err());
    }
}

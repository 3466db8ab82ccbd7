use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

/// Default output root for a run: output/vehicle-analysis-{YYMMDD}
pub fn default_output_dir(date: NaiveDate) -> PathBuf {
    let year = date.year() % 100; // Get last 2 digits of year

    let dirname = format!(
        "vehicle-analysis-{:02}{:02}{:02}",
        year,
        date.month(),
        date.day()
    );
    PathBuf::from("output").join(dirname)
}

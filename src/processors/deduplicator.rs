use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

use crate::models::{CleanedVehicleRecord, ComplaintRecord, StationCandidate};
use crate::processors::report::{Stage, StageReport};

/// Identity of a record for first-occurrence deduplication.
pub trait DedupKey {
    type Key<'a>: Hash + Eq
    where
        Self: 'a;

    fn dedup_key(&self) -> Self::Key<'_>;
}

/// Floats compare by exact value; `None` only equals `None`.
fn float_bits(value: Option<f64>) -> Option<u64> {
    // -0.0 and 0.0 are the same rating
    value.map(|v| if v == 0.0 { 0 } else { v.to_bits() })
}

impl DedupKey for CleanedVehicleRecord {
    type Key<'a> = (
        i32,
        &'a str,
        &'a str,
        Option<u64>,
        Option<u64>,
        &'a str,
        &'a str,
        &'a str,
        [Option<u64>; 3],
    );

    fn dedup_key(&self) -> Self::Key<'_> {
        (
            self.year,
            &self.make,
            &self.model,
            float_bits(self.displacement),
            float_bits(self.cylinders),
            &self.transmission,
            &self.drive,
            &self.primary_fuel,
            [
                float_bits(self.city_mpg),
                float_bits(self.highway_mpg),
                float_bits(self.combined_mpg),
            ],
        )
    }
}

impl DedupKey for ComplaintRecord {
    type Key<'a> = &'a str;

    fn dedup_key(&self) -> Self::Key<'_> {
        &self.complaint_id
    }
}

impl DedupKey for StationCandidate {
    type Key<'a> = Option<&'a str>;

    fn dedup_key(&self) -> Self::Key<'_> {
        self.station_id.as_deref()
    }
}

pub struct Deduplicator;

impl Deduplicator {
    /// Keep the first row for every key, preserving input order.
    pub fn apply<R: DedupKey>(rows: Vec<R>) -> (Vec<R>, StageReport) {
        let mut report = StageReport::new(Stage::Duplicates, rows.len());

        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(rows.len());
            rows.iter().map(|row| seen.insert(row.dedup_key())).collect()
        };

        let kept: Vec<R> = rows
            .into_iter()
            .zip(keep)
            .filter_map(|(row, first)| first.then_some(row))
            .collect();

        let duplicates = report.rows_in - kept.len();
        if duplicates > 0 {
            report
                .drop_reasons
                .insert("duplicate_key".to_string(), duplicates);
        }
        debug!(duplicates, "deduplicated");

        let rows_out = kept.len();
        (kept, report.finish(rows_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::fixtures::complaint;
    use crate::models::vehicle::fixtures::vehicle;

    #[test]
    fn test_first_occurrence_wins() {
        let first = vehicle(2015, "Honda", "Civic", "Regular Gasoline");
        let mut duplicate = first.clone();
        duplicate.source_id = Some("99999".to_string());
        duplicate.co2_g_per_mile = Some(999.0);

        let mut different = first.clone();
        different.combined_mpg = Some(38.0);

        let (kept, report) = Deduplicator::apply(vec![first, duplicate, different]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source_id.as_deref(), Some("30000"));
        assert_eq!(kept[1].combined_mpg, Some(38.0));
        assert_eq!(report.drop_reasons.get("duplicate_key"), Some(&1));
    }

    #[test]
    fn test_nulls_compare_equal() {
        let mut a = vehicle(2015, "Honda", "Civic", "Regular Gasoline");
        a.displacement = None;
        a.cylinders = None;
        let b = a.clone();

        let (kept, _) = Deduplicator::apply(vec![a, b]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![
            complaint("1", 2015, "HONDA", "CIVIC"),
            complaint("2", 2015, "HONDA", "CIVIC"),
            complaint("1", 2016, "HONDA", "ACCORD"),
        ];

        let (once, _) = Deduplicator::apply(rows);
        let (twice, report) = Deduplicator::apply(once.clone());

        assert_eq!(once.len(), 2);
        assert_eq!(once[0].year, 2015);
        assert_eq!(once, twice);
        assert_eq!(report.dropped(), 0);
    }
}

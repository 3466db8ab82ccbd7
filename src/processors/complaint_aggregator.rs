use std::collections::BTreeMap;
use tracing::info;

use crate::models::{ComplaintRecord, ComplaintSummary, JoinKey};
use crate::processors::key_normalizer::Keyed;

// Injury and death sums saturate at i64::MAX
#[derive(Default)]
struct Accumulator {
    total_complaints: u64,
    crash_incidents: u64,
    fire_incidents: u64,
    total_injured: i64,
    total_deaths: i64,
    mileage_sum: f64,
    mileage_count: u64,
}

impl Accumulator {
    fn add(&mut self, complaint: &ComplaintRecord) {
        self.total_complaints += 1;
        self.crash_incidents += u64::from(complaint.crash);
        self.fire_incidents += u64::from(complaint.fire);
        self.total_injured = self.total_injured.saturating_add(complaint.injured.unwrap_or(0));
        self.total_deaths = self.total_deaths.saturating_add(complaint.deaths.unwrap_or(0));

        if let Some(mileage) = complaint.mileage {
            self.mileage_sum += mileage;
            self.mileage_count += 1;
        }
    }

    fn into_summary(self, key: JoinKey) -> ComplaintSummary {
        let avg_complaint_mileage =
            (self.mileage_count > 0).then(|| self.mileage_sum / self.mileage_count as f64);

        ComplaintSummary {
            key,
            total_complaints: self.total_complaints,
            crash_incidents: self.crash_incidents,
            fire_incidents: self.fire_incidents,
            total_injured: self.total_injured,
            total_deaths: self.total_deaths,
            avg_complaint_mileage,
        }
    }
}

/// Rolls cleaned complaints up to one summary per join key.
pub struct ComplaintAggregator;

impl ComplaintAggregator {
    pub fn aggregate(complaints: &[ComplaintRecord]) -> BTreeMap<JoinKey, ComplaintSummary> {
        let mut groups: BTreeMap<JoinKey, Accumulator> = BTreeMap::new();

        for complaint in complaints {
            groups.entry(complaint.join_key()).or_default().add(complaint);
        }

        let summaries: BTreeMap<JoinKey, ComplaintSummary> = groups
            .into_iter()
            .map(|(key, acc)| (key.clone(), acc.into_summary(key)))
            .collect();

        info!(
            complaints = complaints.len(),
            keys = summaries.len(),
            "complaints aggregated"
        );
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::fixtures::complaint;
    use crate::processors::key_normalizer::KeyNormalizer;

    #[test]
    fn test_counts_and_sums() {
        let mut a = complaint("1", 2011, "CHEVROLET", "VOLT");
        a.crash = true;
        a.injured = Some(2);
        a.mileage = Some(10_000.0);

        let mut b = complaint("2", 2011, "Chevrolet", "Volt ");
        b.fire = true;
        b.injured = None;
        b.deaths = Some(1);
        b.mileage = Some(30_000.0);

        let mut c = complaint("3", 2011, "CHEVROLET", "VOLT");
        c.mileage = None;

        let summaries = ComplaintAggregator::aggregate(&[a, b, c]);
        assert_eq!(summaries.len(), 1);

        let summary = &summaries[&KeyNormalizer::normalize(2011, "chevrolet", "volt")];
        assert_eq!(summary.total_complaints, 3);
        assert_eq!(summary.crash_incidents, 1);
        assert_eq!(summary.fire_incidents, 1);
        assert_eq!(summary.total_injured, 2);
        assert_eq!(summary.total_deaths, 1);
        assert_eq!(summary.avg_complaint_mileage, Some(20_000.0));
    }

    #[test]
    fn test_no_mileage_means_no_average() {
        let summaries = ComplaintAggregator::aggregate(&[complaint("1", 2015, "FORD", "F-150")]);
        let summary = summaries.values().next().unwrap();

        assert_eq!(summary.avg_complaint_mileage, None);
    }

    #[test]
    fn test_casualty_sums_saturate() {
        let mut a = complaint("1", 2011, "CHEVROLET", "VOLT");
        a.injured = Some(i64::MAX);
        a.deaths = Some(i64::MAX - 1);

        let mut b = complaint("2", 2011, "CHEVROLET", "VOLT");
        b.injured = Some(1);
        b.deaths = Some(5);

        let summaries = ComplaintAggregator::aggregate(&[a, b]);
        let summary = summaries.values().next().unwrap();

        assert_eq!(summary.total_complaints, 2);
        assert_eq!(summary.total_injured, i64::MAX);
        assert_eq!(summary.total_deaths, i64::MAX);
    }

    #[test]
    fn test_every_complaint_counted_once() {
        let complaints = vec![
            complaint("1", 2015, "FORD", "F-150"),
            complaint("2", 2016, "FORD", "F-150"),
            complaint("3", 2015, "FORD", "ESCAPE"),
            complaint("4", 2015, "FORD", "F-150"),
        ];

        let summaries = ComplaintAggregator::aggregate(&complaints);
        let total: u64 = summaries.values().map(|s| s.total_complaints).sum();

        assert_eq!(summaries.len(), 3);
        assert_eq!(total, complaints.len() as u64);
        assert!(summaries.values().all(|s| s.total_complaints > 0));
    }
}

use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::models::{
    ComplaintMetrics, ComplaintSummary, ExplodedVehicleFuelRecord, JoinKey, VehicleComplaintRecord,
};
use crate::processors::key_normalizer::Keyed;

/// Left join of vehicle-fuel rows against complaint summaries.
pub struct JoinEngine;

impl JoinEngine {
    /// One output row per input row, in input order. Vehicles without a
    /// summary get [`ComplaintMetrics::NO_COMPLAINTS`]. Every row carries the
    /// number of vehicle-fuel rows that share its join key.
    pub fn join_complaints(
        vehicles: &[ExplodedVehicleFuelRecord],
        summaries: &BTreeMap<JoinKey, ComplaintSummary>,
    ) -> Vec<VehicleComplaintRecord> {
        let keys: Vec<JoinKey> = vehicles.iter().map(|row| row.vehicle.join_key()).collect();

        let mut variants: HashMap<&JoinKey, u64> = HashMap::new();
        for key in &keys {
            *variants.entry(key).or_default() += 1;
        }

        let mut matched = 0usize;

        let joined: Vec<VehicleComplaintRecord> = vehicles
            .iter()
            .zip(&keys)
            .map(|(row, key)| {
                let complaints = match summaries.get(key) {
                    Some(summary) => {
                        matched += 1;
                        ComplaintMetrics::from(summary)
                    }
                    None => ComplaintMetrics::NO_COMPLAINTS,
                };

                VehicleComplaintRecord {
                    vehicle: row.clone(),
                    complaints,
                    vehicle_variants: variants.get(key).copied().unwrap_or(1),
                }
            })
            .collect();

        info!(
            rows = joined.len(),
            matched,
            zero_filled = joined.len() - matched,
            "vehicles joined to complaints"
        );
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::fixtures::complaint;
    use crate::models::vehicle::fixtures::{vehicle, volt};
    use crate::processors::complaint_aggregator::ComplaintAggregator;
    use crate::processors::row_exploder::RowExploder;

    #[test]
    fn test_left_join_with_zero_fill() {
        let (rows, _) = RowExploder::apply(vec![
            volt(),
            vehicle(2015, "Honda", "Civic", "Regular Gasoline"),
        ]);

        let mut first = complaint("1", 2011, "CHEVROLET", "VOLT");
        first.crash = true;
        first.mileage = Some(42_000.0);
        let summaries =
            ComplaintAggregator::aggregate(&[first, complaint("2", 2011, "CHEVROLET", "VOLT")]);

        let joined = JoinEngine::join_complaints(&rows, &summaries);
        assert_eq!(joined.len(), 3);

        // Both fuel rows of the Volt carry the same complaint metrics
        for row in &joined[..2] {
            assert_eq!(row.vehicle.vehicle.model, "Volt");
            assert_eq!(row.complaints.total_complaints, 2);
            assert_eq!(row.complaints.crash_incidents, 1);
            assert_eq!(row.complaints.avg_complaint_mileage, Some(42_000.0));
        }

        let civic = &joined[2];
        assert_eq!(civic.vehicle.vehicle.model, "Civic");
        assert_eq!(civic.complaints, ComplaintMetrics::NO_COMPLAINTS);
        assert_eq!(civic.complaints.avg_complaint_mileage, None);
        assert_eq!(civic.vehicle_variants, 1);

        // Each fuel row of the Volt counts toward its key
        assert!(joined[..2].iter().all(|r| r.vehicle_variants == 2));
    }

    #[test]
    fn test_variants_count_trims_of_one_model() {
        let mut base = vehicle(2015, "Honda", "Civic", "Regular Gasoline");
        base.source_id = Some("1".to_string());
        let mut sport = vehicle(2015, "HONDA", "civic ", "Premium Gasoline");
        sport.source_id = Some("2".to_string());
        let accord = vehicle(2015, "Honda", "Accord", "Regular Gasoline");

        let (rows, _) = RowExploder::apply(vec![base, sport, accord]);
        let joined = JoinEngine::join_complaints(&rows, &BTreeMap::new());

        let variants: Vec<u64> = joined.iter().map(|r| r.vehicle_variants).collect();
        assert_eq!(variants, vec![2, 2, 1]);
        assert!(joined.iter().all(|r| r.complaints == ComplaintMetrics::NO_COMPLAINTS));
    }

    #[test]
    fn test_no_summaries_at_all() {
        let (rows, _) = RowExploder::apply(vec![volt()]);
        let joined = JoinEngine::join_complaints(&rows, &BTreeMap::new());

        assert_eq!(joined.len(), rows.len());
        assert!(joined.iter().all(|r| r.complaints.total_complaints == 0));
    }
}

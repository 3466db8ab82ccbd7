use crate::error::Result;
use crate::models::{
    Dataset, NormalizedStationRow, RawRecord, RawTable, StationCandidate, StationRecord,
    StationStatus,
};
use crate::processors::cleaning::{CleanedTable, SourceCleaningPipeline, StageLog};
use crate::processors::deduplicator::Deduplicator;
use crate::processors::normalizer::{display_text, key_text, FieldNormalizer};
use crate::processors::outlier_filter::{OutlierFilter, ReferenceDate};
use crate::processors::report::{Stage, StageReport};
use crate::processors::validator::CriticalFieldValidator;
use crate::utils::constants::DOE_DATE_FORMAT;

struct DoeColumns {
    latitude: usize,
    longitude: usize,
    fuel_type_code: usize,
    status_code: usize,
    id: usize,
    station_name: Option<usize>,
    street_address: Option<usize>,
    city: Option<usize>,
    state: Option<usize>,
    zip: Option<usize>,
    access_code: Option<usize>,
    open_date: Option<usize>,
    ev_network: Option<usize>,
    ev_connector_types: Option<usize>,
    ev_pricing: Option<usize>,
}

impl DoeColumns {
    fn resolve(table: &RawTable) -> Result<Self> {
        Ok(Self {
            latitude: table.column("latitude")?,
            longitude: table.column("longitude")?,
            fuel_type_code: table.column("fuel_type_code")?,
            status_code: table.column("status_code")?,
            id: table.column("id")?,
            station_name: table.optional_column("station_name"),
            street_address: table.optional_column("street_address"),
            city: table.optional_column("city"),
            state: table.optional_column("state"),
            zip: table.optional_column("zip"),
            access_code: table.optional_column("access_code"),
            open_date: table.optional_column("open_date"),
            ev_network: table.optional_column("ev_network"),
            ev_connector_types: table.optional_column("ev_connector_types"),
            ev_pricing: table.optional_column("ev_pricing"),
        })
    }

    fn normalize(&self, record: &RawRecord, normalizer: &mut FieldNormalizer) -> NormalizedStationRow {
        NormalizedStationRow {
            station_id: display_text(record.get(self.id)),
            fuel_type_code: key_text(record.get(self.fuel_type_code)),
            latitude: normalizer.float("latitude", record.get(self.latitude)),
            longitude: normalizer.float("longitude", record.get(self.longitude)),
            status_code: normalizer.code("status_code", record.get(self.status_code), StationStatus::parse),
            access_code: display_text(record.get_opt(self.access_code)),
            open_date: normalizer.date("open_date", record.get_opt(self.open_date), DOE_DATE_FORMAT),
            station_name: display_text(record.get_opt(self.station_name)),
            street_address: display_text(record.get_opt(self.street_address)),
            city: display_text(record.get_opt(self.city)),
            state: display_text(record.get_opt(self.state)),
            zip: display_text(record.get_opt(self.zip)),
            ev_network: display_text(record.get_opt(self.ev_network)),
            ev_connector_types: display_text(record.get_opt(self.ev_connector_types)),
            ev_pricing: display_text(record.get_opt(self.ev_pricing)),
        }
    }
}

/// DOE station cleaning: validate, filter, dedup, keep alternative fuels.
pub struct DoePipeline {
    outliers: OutlierFilter,
}

impl DoePipeline {
    pub fn new(reference: ReferenceDate) -> Self {
        Self {
            outliers: OutlierFilter::new(reference),
        }
    }

    fn fuel_scope(candidates: Vec<StationCandidate>) -> (Vec<StationRecord>, StageReport) {
        let mut report = StageReport::new(Stage::FuelScope, candidates.len());

        let kept: Vec<StationRecord> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let station = candidate.into_station();
                if station.is_none() {
                    report.record_drop("fuel_type_out_of_scope");
                }
                station
            })
            .collect();

        let rows_out = kept.len();
        (kept, report.finish(rows_out))
    }
}

impl Default for DoePipeline {
    fn default() -> Self {
        Self::new(ReferenceDate::default())
    }
}

impl SourceCleaningPipeline for DoePipeline {
    type Output = StationRecord;

    const DATASET: Dataset = Dataset::Doe;

    fn clean(&self, table: &RawTable) -> Result<CleanedTable<StationRecord>> {
        let columns = DoeColumns::resolve(table)?;
        let mut log = StageLog::start(table)?;

        let mut normalizer = FieldNormalizer::new();
        let normalized: Vec<NormalizedStationRow> = table
            .rows()
            .iter()
            .map(|record| columns.normalize(record, &mut normalizer))
            .collect();
        log.coercions(normalizer.into_failures());

        let (valid, report) = CriticalFieldValidator::apply(normalized);
        log.record(report)?;

        let (plausible, report) = self.outliers.apply(valid);
        log.record(report)?;

        let (unique, report) = Deduplicator::apply(plausible);
        log.record(report)?;

        let (stations, report) = Self::fuel_scope(unique);
        log.record(report)?;

        Ok(log.finish(stations))
    }
}

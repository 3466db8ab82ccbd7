use tracing::debug;

use crate::error::Result;
use crate::models::{Dataset, ExplodedVehicleFuelRecord, NormalizedVehicleRow, RawRecord, RawTable};
use crate::processors::cleaning::{CleanedTable, SourceCleaningPipeline, StageLog};
use crate::processors::deduplicator::Deduplicator;
use crate::processors::normalizer::{display_text, FieldNormalizer};
use crate::processors::outlier_filter::{OutlierFilter, ReferenceDate};
use crate::processors::report::{Stage, StageReport};
use crate::processors::row_exploder::RowExploder;
use crate::processors::validator::CriticalFieldValidator;
use crate::utils::constants::MIN_MODEL_YEAR;

/// Column positions of the EPA `vehicles.csv` snapshot.
struct EpaColumns {
    year: usize,
    make: usize,
    model: usize,
    city08: usize,
    highway08: usize,
    comb08: usize,
    displ: usize,
    cylinders: usize,
    trany: usize,
    drive: usize,
    fuel_type1: usize,
    vclass: Option<usize>,
    fuel_type2: Option<usize>,
    co2: Option<usize>,
    id: Option<usize>,
}

impl EpaColumns {
    fn resolve(table: &RawTable) -> Result<Self> {
        Ok(Self {
            year: table.column("year")?,
            make: table.column("make")?,
            model: table.column("model")?,
            city08: table.column("city08")?,
            highway08: table.column("highway08")?,
            comb08: table.column("comb08")?,
            displ: table.column("displ")?,
            cylinders: table.column("cylinders")?,
            trany: table.column("trany")?,
            drive: table.column("drive")?,
            fuel_type1: table.column("fuelType1")?,
            vclass: table.optional_column("VClass"),
            fuel_type2: table.optional_column("fuelType2"),
            co2: table.optional_column("co2TailpipeGpm"),
            id: table.optional_column("id"),
        })
    }

    fn normalize(&self, record: &RawRecord, normalizer: &mut FieldNormalizer) -> NormalizedVehicleRow {
        NormalizedVehicleRow {
            year: normalizer.year("year", record.get(self.year)),
            make: display_text(record.get(self.make)),
            model: display_text(record.get(self.model)),
            vehicle_class: display_text(record.get_opt(self.vclass)),
            drive: display_text(record.get(self.drive)),
            transmission: display_text(record.get(self.trany)),
            cylinders: normalizer.float("cylinders", record.get(self.cylinders)),
            displacement: normalizer.float("displ", record.get(self.displ)),
            primary_fuel: display_text(record.get(self.fuel_type1)),
            secondary_fuel: display_text(record.get_opt(self.fuel_type2)),
            city_mpg: normalizer.float("city08", record.get(self.city08)),
            highway_mpg: normalizer.float("highway08", record.get(self.highway08)),
            combined_mpg: normalizer.float("comb08", record.get(self.comb08)),
            co2_g_per_mile: normalizer.float("co2TailpipeGpm", record.get_opt(self.co2)),
            source_id: display_text(record.get_opt(self.id)),
        }
    }
}

/// EPA fuel-economy cleaning: scope, validate, filter, dedup, explode.
pub struct EpaPipeline {
    outliers: OutlierFilter,
}

impl EpaPipeline {
    pub fn new(reference: ReferenceDate) -> Self {
        Self {
            outliers: OutlierFilter::new(reference),
        }
    }

    /// Drop model years before the analysis window. Null years pass through
    /// to the critical-field check.
    fn model_year_scope(rows: Vec<NormalizedVehicleRow>) -> (Vec<NormalizedVehicleRow>, StageReport) {
        let mut report = StageReport::new(Stage::ModelYearScope, rows.len());

        let kept: Vec<NormalizedVehicleRow> = rows
            .into_iter()
            .filter(|row| match row.year {
                Some(year) if year < MIN_MODEL_YEAR => {
                    report.record_drop("before_min_model_year");
                    false
                }
                _ => true,
            })
            .collect();

        let rows_out = kept.len();
        (kept, report.finish(rows_out))
    }
}

impl Default for EpaPipeline {
    fn default() -> Self {
        Self::new(ReferenceDate::default())
    }
}

impl SourceCleaningPipeline for EpaPipeline {
    type Output = ExplodedVehicleFuelRecord;

    const DATASET: Dataset = Dataset::Epa;

    fn clean(&self, table: &RawTable) -> Result<CleanedTable<ExplodedVehicleFuelRecord>> {
        let columns = EpaColumns::resolve(table)?;
        let mut log = StageLog::start(table)?;

        let mut normalizer = FieldNormalizer::new();
        let normalized: Vec<NormalizedVehicleRow> = table
            .rows()
            .iter()
            .map(|record| columns.normalize(record, &mut normalizer))
            .collect();
        log.coercions(normalizer.into_failures());

        let (scoped, report) = Self::model_year_scope(normalized);
        log.record(report)?;

        let (valid, report) = CriticalFieldValidator::apply(scoped);
        log.record(report)?;

        let (plausible, report) = self.outliers.apply(valid);
        log.record(report)?;

        let (unique, report) = Deduplicator::apply(plausible);
        log.record(report)?;

        let dual_fuel = unique.iter().filter(|v| v.is_dual_fuel()).count();
        debug!(dual_fuel, "exploding fuel types");

        let (exploded, report) = RowExploder::apply(unique);
        log.record(report)?;

        Ok(log.finish(exploded))
    }
}

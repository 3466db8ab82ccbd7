use crate::error::Result;
use crate::models::{ComplaintRecord, Dataset, NormalizedComplaintRow, RawRecord, RawTable};
use crate::processors::cleaning::{CleanedTable, SourceCleaningPipeline, StageLog};
use crate::processors::deduplicator::Deduplicator;
use crate::processors::normalizer::{display_text, flag, FieldNormalizer};
use crate::processors::outlier_filter::{OutlierFilter, ReferenceDate};
use crate::processors::validator::CriticalFieldValidator;
use crate::utils::constants::NHTSA_DATE_FORMAT;

/// Positions of the consumed NHTSA flat-file columns.
struct NhtsaColumns {
    odino: usize,
    cmplid: usize,
    mfgtxt: usize,
    maketxt: usize,
    modeltxt: usize,
    yeartxt: usize,
    crash: usize,
    datea: usize,
    fire: usize,
    injured: usize,
    deaths: usize,
    compdesc: usize,
    vin: usize,
    mileage: usize,
}

impl NhtsaColumns {
    fn resolve(table: &RawTable) -> Result<Self> {
        Ok(Self {
            odino: table.column("ODINO")?,
            cmplid: table.column("CMPLID")?,
            mfgtxt: table.column("MFGTXT")?,
            maketxt: table.column("MAKETXT")?,
            modeltxt: table.column("MODELTXT")?,
            yeartxt: table.column("YEARTXT")?,
            crash: table.column("CRASH")?,
            datea: table.column("DATEA")?,
            fire: table.column("FIRE")?,
            injured: table.column("INJURED")?,
            deaths: table.column("DEATHS")?,
            compdesc: table.column("COMPDESC")?,
            vin: table.column("VIN")?,
            mileage: table.column("MILEAGE")?,
        })
    }

    fn normalize(&self, record: &RawRecord, normalizer: &mut FieldNormalizer) -> NormalizedComplaintRow {
        NormalizedComplaintRow {
            complaint_id: display_text(record.get(self.odino)),
            date: normalizer.date("DATEA", record.get(self.datea), NHTSA_DATE_FORMAT),
            year: normalizer.year("YEARTXT", record.get(self.yeartxt)),
            make: display_text(record.get(self.maketxt)),
            model: display_text(record.get(self.modeltxt)),
            component: display_text(record.get(self.compdesc)),
            crash: flag(record.get(self.crash)),
            fire: flag(record.get(self.fire)),
            injured: normalizer.int("INJURED", record.get(self.injured)),
            deaths: normalizer.int("DEATHS", record.get(self.deaths)),
            mileage: normalizer.float("MILEAGE", record.get(self.mileage)),
            manufacturer: display_text(record.get(self.mfgtxt)),
            cmpl_id: display_text(record.get(self.cmplid)),
            vin: display_text(record.get(self.vin)),
        }
    }
}

/// NHTSA complaint cleaning: validate, filter, dedup on ODI number.
pub struct NhtsaPipeline {
    outliers: OutlierFilter,
}

impl NhtsaPipeline {
    pub fn new(reference: ReferenceDate) -> Self {
        Self {
            outliers: OutlierFilter::new(reference),
        }
    }
}

impl Default for NhtsaPipeline {
    fn default() -> Self {
        Self::new(ReferenceDate::default())
    }
}

impl SourceCleaningPipeline for NhtsaPipeline {
    type Output = ComplaintRecord;

    const DATASET: Dataset = Dataset::Nhtsa;

    fn clean(&self, table: &RawTable) -> Result<CleanedTable<ComplaintRecord>> {
        let columns = NhtsaColumns::resolve(table)?;
        let mut log = StageLog::start(table)?;

        let mut normalizer = FieldNormalizer::new();
        let normalized: Vec<NormalizedComplaintRow> = table
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

        Ok(log.finish(unique))
    }
}

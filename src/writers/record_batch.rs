//! Arrow schemas and `RecordBatch` conversion for every output table.
//!
//! Column names follow the source vocabularies (EPA `city08`, NHTSA `ODINO`,
//! ...) so the tables line up with the published data dictionaries.

use arrow::array::{
    ArrayRef, Date32Array, Float64Array, Int32Array, Int64Array, StringArray, UInt64Array,
    UInt8Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{
    ComplaintMetrics, ComplaintRecord, ComprehensiveVehicleRecord, ExplodedVehicleFuelRecord,
    FuelInfrastructureRecord, StationRecord, VehicleComplaintRecord,
};

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Y"
    } else {
        "N"
    }
}

/// A row type that can be written as an Arrow table.
pub trait ToRecordBatch: Sized {
    fn schema() -> SchemaRef;

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch>;
}

fn vehicle_fields() -> Vec<Field> {
    vec![
        Field::new("year", DataType::Int32, false),
        Field::new("make", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("VClass", DataType::Utf8, false),
        Field::new("drive", DataType::Utf8, false),
        Field::new("trany", DataType::Utf8, false),
        Field::new("cylinders", DataType::Float64, true),
        Field::new("displ", DataType::Float64, true),
        Field::new("primary_fuel", DataType::Utf8, false),
        Field::new("secondary_fuel", DataType::Utf8, true),
        Field::new("fuel_used", DataType::Utf8, false),
        Field::new("fuel_rank", DataType::UInt8, false),
        Field::new("city08", DataType::Float64, true),
        Field::new("highway08", DataType::Float64, true),
        Field::new("comb08", DataType::Float64, true),
        Field::new("co2TailpipeGpm", DataType::Float64, true),
        Field::new("id", DataType::Utf8, true),
    ]
}

fn vehicle_columns<'a>(rows: impl Iterator<Item = &'a ExplodedVehicleFuelRecord> + Clone) -> Vec<ArrayRef> {
    let text = |f: fn(&'a ExplodedVehicleFuelRecord) -> &'a str| -> ArrayRef {
        Arc::new(StringArray::from(rows.clone().map(f).collect::<Vec<_>>()))
    };
    let optional_text = |f: fn(&'a ExplodedVehicleFuelRecord) -> Option<&'a str>| -> ArrayRef {
        Arc::new(StringArray::from(rows.clone().map(f).collect::<Vec<_>>()))
    };
    let float = |f: fn(&ExplodedVehicleFuelRecord) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.clone().map(f).collect::<Vec<_>>()))
    };

    vec![
        Arc::new(Int32Array::from(rows.clone().map(|r| r.vehicle.year).collect::<Vec<_>>())),
        text(|r| &r.vehicle.make),
        text(|r| &r.vehicle.model),
        text(|r| &r.vehicle.vehicle_class),
        text(|r| &r.vehicle.drive),
        text(|r| &r.vehicle.transmission),
        float(|r| r.vehicle.cylinders),
        float(|r| r.vehicle.displacement),
        text(|r| &r.vehicle.primary_fuel),
        optional_text(|r| r.vehicle.secondary_fuel.as_deref()),
        text(|r| &r.fuel_used),
        Arc::new(UInt8Array::from(rows.clone().map(|r| r.fuel_rank).collect::<Vec<_>>())),
        float(|r| r.vehicle.city_mpg),
        float(|r| r.vehicle.highway_mpg),
        float(|r| r.vehicle.combined_mpg),
        float(|r| r.vehicle.co2_g_per_mile),
        optional_text(|r| r.vehicle.source_id.as_deref()),
    ]
}

fn complaint_metric_fields() -> Vec<Field> {
    vec![
        Field::new("total_complaints", DataType::UInt64, false),
        Field::new("crash_incidents", DataType::UInt64, false),
        Field::new("fire_incidents", DataType::UInt64, false),
        Field::new("total_injured", DataType::Int64, false),
        Field::new("total_deaths", DataType::Int64, false),
        Field::new("avg_complaint_mileage", DataType::Float64, true),
        Field::new("vehicle_variants", DataType::UInt64, false),
    ]
}

fn complaint_metric_columns<'a>(rows: impl Iterator<Item = &'a VehicleComplaintRecord> + Clone) -> Vec<ArrayRef> {
    let metrics = rows.clone().map(|r| &r.complaints);
    let count = |f: fn(&ComplaintMetrics) -> u64| -> ArrayRef {
        Arc::new(UInt64Array::from(metrics.clone().map(f).collect::<Vec<_>>()))
    };
    let total = |f: fn(&ComplaintMetrics) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(metrics.clone().map(f).collect::<Vec<_>>()))
    };

    vec![
        count(|m| m.total_complaints),
        count(|m| m.crash_incidents),
        count(|m| m.fire_incidents),
        total(|m| m.total_injured),
        total(|m| m.total_deaths),
        Arc::new(Float64Array::from(
            metrics.clone().map(|m| m.avg_complaint_mileage).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from(
            rows.map(|r| r.vehicle_variants).collect::<Vec<_>>(),
        )),
    ]
}

impl ToRecordBatch for ExplodedVehicleFuelRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vehicle_fields()))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        Ok(RecordBatch::try_new(Self::schema(), vehicle_columns(rows.iter()))?)
    }
}

impl ToRecordBatch for VehicleComplaintRecord {
    fn schema() -> SchemaRef {
        let mut fields = vehicle_fields();
        fields.extend(complaint_metric_fields());
        Arc::new(Schema::new(fields))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let mut columns = vehicle_columns(rows.iter().map(|r| &r.vehicle));
        columns.extend(complaint_metric_columns(rows.iter()));
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl ToRecordBatch for ComprehensiveVehicleRecord {
    fn schema() -> SchemaRef {
        let mut fields = vehicle_fields();
        fields.extend(complaint_metric_fields());
        fields.push(Field::new("fuel_type_code", DataType::Utf8, true));
        fields.push(Field::new("stations_nationwide", DataType::UInt64, false));
        Arc::new(Schema::new(fields))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let mut columns = vehicle_columns(rows.iter().map(|r| &r.analysis.vehicle));
        columns.extend(complaint_metric_columns(rows.iter().map(|r| &r.analysis)));
        columns.push(Arc::new(StringArray::from(
            rows.iter()
                .map(|r| r.fuel_type_code.map(|code| code.as_str()))
                .collect::<Vec<_>>(),
        )));
        columns.push(Arc::new(UInt64Array::from(
            rows.iter().map(|r| r.stations_nationwide).collect::<Vec<_>>(),
        )));
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl ToRecordBatch for ComplaintRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("ODINO", DataType::Utf8, false),
            Field::new("DATEA", DataType::Utf8, false),
            Field::new("YEARTXT", DataType::Int32, false),
            Field::new("MAKETXT", DataType::Utf8, false),
            Field::new("MODELTXT", DataType::Utf8, false),
            Field::new("MFGTXT", DataType::Utf8, true),
            Field::new("CMPLID", DataType::Utf8, true),
            Field::new("COMPDESC", DataType::Utf8, true),
            Field::new("CRASH", DataType::Utf8, false),
            Field::new("FIRE", DataType::Utf8, false),
            Field::new("INJURED", DataType::Int64, true),
            Field::new("DEATHS", DataType::Int64, true),
            Field::new("MILEAGE", DataType::Int64, true),
            Field::new("VIN", DataType::Utf8, true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let dates: Vec<String> = rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(rows.iter().map(|r| r.complaint_id.as_str()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(dates)),
            Arc::new(Int32Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.make.as_str()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.model.as_str()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.manufacturer.as_deref()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.cmpl_id.as_deref()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.component.as_deref()).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| yes_no(r.crash)).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| yes_no(r.fire)).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.injured).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.deaths).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.mileage.map(|m| m.round() as i64)).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(rows.iter().map(|r| r.vin.as_deref()).collect::<Vec<_>>())),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl ToRecordBatch for StationRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("fuel_type_code", DataType::Utf8, false),
            Field::new("station_name", DataType::Utf8, true),
            Field::new("street_address", DataType::Utf8, true),
            Field::new("city", DataType::Utf8, true),
            Field::new("state", DataType::Utf8, true),
            Field::new("zip", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("status_code", DataType::Utf8, false),
            Field::new("access_code", DataType::Utf8, true),
            Field::new("open_date", DataType::Date32, true),
            Field::new("ev_network", DataType::Utf8, true),
            Field::new("ev_connector_types", DataType::Utf8, true),
            Field::new("ev_pricing", DataType::Utf8, true),
            Field::new("id", DataType::Utf8, true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let text = |f: fn(&StationRecord) -> Option<&str>| -> ArrayRef {
            Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
        };

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.fuel_type_code.as_str()).collect::<Vec<_>>(),
            )),
            text(|r| r.station_name.as_deref()),
            text(|r| r.street_address.as_deref()),
            text(|r| r.city.as_deref()),
            text(|r| r.state.as_deref()),
            text(|r| r.zip.as_deref()),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.latitude).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.longitude).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.status_code.as_code()).collect::<Vec<_>>(),
            )),
            text(|r| r.access_code.as_deref()),
            Arc::new(Date32Array::from(
                rows.iter().map(|r| r.open_date.map(date32)).collect::<Vec<_>>(),
            )),
            text(|r| r.ev_network.as_deref()),
            text(|r| r.ev_connector_types.as_deref()),
            text(|r| r.ev_pricing.as_deref()),
            text(|r| r.station_id.as_deref()),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl ToRecordBatch for FuelInfrastructureRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("fuel_type_code", DataType::Utf8, false),
            Field::new("vehicle_count", DataType::UInt64, false),
            Field::new("avg_combined_mpg", DataType::Float64, true),
            Field::new("avg_city_mpg", DataType::Float64, true),
            Field::new("avg_highway_mpg", DataType::Float64, true),
            Field::new("total_stations", DataType::UInt64, false),
            Field::new("available_stations", DataType::UInt64, false),
            Field::new("vehicles_per_station", DataType::Float64, true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let float = |f: fn(&FuelInfrastructureRecord) -> Option<f64>| -> ArrayRef {
            Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
        };
        let count = |f: fn(&FuelInfrastructureRecord) -> u64| -> ArrayRef {
            Arc::new(UInt64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
        };

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.fuel_type_code.as_str()).collect::<Vec<_>>(),
            )),
            count(|r| r.vehicle_count),
            float(|r| r.avg_combined_mpg),
            float(|r| r.avg_city_mpg),
            float(|r| r.avg_highway_mpg),
            count(|r| r.total_stations),
            count(|r| r.available_stations),
            float(|r| r.vehicles_per_station),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::complaint::fixtures::complaint;
    use crate::models::station::fixtures::station;
    use crate::models::vehicle::fixtures::volt;
    use crate::models::{FuelTypeCode, StationStatus};
    use crate::processors::row_exploder::RowExploder;
    use arrow::array::Array;

    #[test]
    fn test_vehicle_batch_layout() -> Result<()> {
        let (rows, _) = RowExploder::apply(vec![volt()]);
        let batch = ExplodedVehicleFuelRecord::to_record_batch(&rows)?;

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 17);
        assert_eq!(batch.schema().field(11).name(), "fuel_rank");

        let fuel_used = batch
            .column(10)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(fuel_used.value(1), "Electricity");
        Ok(())
    }

    #[test]
    fn test_complaint_batch_flags_and_dates() -> Result<()> {
        let mut record = complaint("11400001", 2011, "CHEVROLET", "VOLT");
        record.crash = true;
        record.mileage = Some(42_000.4);

        let batch = ComplaintRecord::to_record_batch(&[record])?;
        let text = |index: usize| {
            batch
                .column(index)
                .as_any()
                .downcast_ref::<StringArray>()
                .unwrap()
                .value(0)
                .to_string()
        };

        assert_eq!(text(1), "2022-03-14");
        assert_eq!(text(8), "Y");
        assert_eq!(text(9), "N");

        let mileage = batch.column(12).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(mileage.value(0), 42_000);
        Ok(())
    }

    #[test]
    fn test_station_open_date_is_date32() -> Result<()> {
        let mut closed = station("2", FuelTypeCode::Cng, StationStatus::Planned);
        closed.open_date = None;
        let rows = vec![station("1", FuelTypeCode::Elec, StationStatus::Available), closed];

        let batch = StationRecord::to_record_batch(&rows)?;
        let dates = batch.column(10).as_any().downcast_ref::<Date32Array>().unwrap();

        // 2019-06-01
        assert_eq!(dates.value(0), 18048);
        assert!(dates.is_null(1));
        Ok(())
    }

    #[test]
    fn test_empty_batch_keeps_schema() -> Result<()> {
        let batch = FuelInfrastructureRecord::to_record_batch(&[])?;
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 9);
        Ok(())
    }
}

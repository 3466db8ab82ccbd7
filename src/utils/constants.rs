/// Raw snapshot file names
pub const EPA_FILE: &str = "vehicles.csv";
pub const NHTSA_FILE: &str = "COMPLAINTS_RECEIVED_2020-2024.txt";
pub const DOE_FILE: &str = "alt_fuel_stations.csv";

/// Output directories and table names
pub const PROCESSED_DIR: &str = "processed";
pub const INTEGRATED_DIR: &str = "integrated";
pub const RUN_REPORT_FILE: &str = "run_report.json";

pub const EPA_CLEAN_TABLE: &str = "epa_vehicles_clean";
pub const NHTSA_CLEAN_TABLE: &str = "nhtsa_complaints_clean";
pub const DOE_CLEAN_TABLE: &str = "doe_fuel_stations_clean";
pub const VEHICLE_COMPLAINTS_TABLE: &str = "vehicle_complaints_analysis";
pub const FUEL_INFRASTRUCTURE_TABLE: &str = "fuel_infrastructure_analysis";
pub const COMPREHENSIVE_TABLE: &str = "comprehensive_vehicle_analysis";

/// EPA scope: model years before this are out of scope
pub const MIN_MODEL_YEAR: i32 = 2010;

/// EPA outlier thresholds
pub const MAX_NON_ELECTRIC_MPG: f64 = 200.0;
pub const ELECTRIC_FUEL_MARKER: &str = "electric";

/// NHTSA outlier thresholds
pub const MAX_COMPLAINT_MILEAGE: f64 = 1_000_000.0;

/// Date formats, one per dataset
pub const NHTSA_DATE_FORMAT: &str = "%Y%m%d";
pub const DOE_DATE_FORMAT: &str = "%Y-%m-%d";

/// NHTSA flat file: tab-delimited, no header, zero-based positions
pub const NHTSA_DELIMITER: u8 = b'\t';
pub const NHTSA_COLUMNS: [(usize, &str); 14] = [
    (0, "ODINO"),
    (1, "CMPLID"),
    (2, "MFGTXT"),
    (3, "MAKETXT"),
    (4, "MODELTXT"),
    (5, "YEARTXT"),
    (6, "CRASH"),
    (7, "DATEA"),
    (8, "FIRE"),
    (9, "INJURED"),
    (10, "DEATHS"),
    (11, "COMPDESC"),
    (14, "VIN"),
    (17, "MILEAGE"),
];

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Integrity expectations for a full national snapshot
pub const DEFAULT_MIN_VEHICLE_ROWS: usize = 20000;
pub const DEFAULT_MIN_INFRASTRUCTURE_ROWS: usize = 30;
pub const DEFAULT_MIN_COMPREHENSIVE_ROWS: usize = 20000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

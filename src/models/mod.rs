pub mod complaint;
pub mod integrated;
pub mod join_key;
pub mod normalized;
pub mod station;
pub mod table;
pub mod vehicle;

pub use complaint::{ComplaintRecord, ComplaintSummary};
pub use integrated::{
    ComplaintMetrics, ComprehensiveVehicleRecord, FuelInfrastructureRecord, VehicleComplaintRecord,
};
pub use join_key::JoinKey;
pub use normalized::{
    NormalizedComplaintRow, NormalizedStationRow, NormalizedVehicleRow, StationCandidate,
};
pub use station::{FuelTypeCode, StationRecord, StationStatus};
pub use table::{Dataset, RawRecord, RawTable};
pub use vehicle::{CleanedVehicleRecord, ExplodedVehicleFuelRecord};

pub mod cleaning;
pub mod complaint_aggregator;
pub mod deduplicator;
pub mod infrastructure_aggregator;
pub mod integrity_checker;
pub mod join_engine;
pub mod key_normalizer;
pub mod normalizer;
pub mod orchestrator;
pub mod outlier_filter;
pub mod report;
pub mod row_exploder;
pub mod validator;

pub use cleaning::{
    CleanedTable, DoePipeline, EpaPipeline, NhtsaPipeline, SourceCleaningPipeline,
};
pub use complaint_aggregator::ComplaintAggregator;
pub use deduplicator::{DedupKey, Deduplicator};
pub use infrastructure_aggregator::{station_fuel_code, InfrastructureAggregator, StationCounts};
pub use integrity_checker::{IntegrityChecker, IntegrityReport, Violation, ViolationType};
pub use join_engine::JoinEngine;
pub use key_normalizer::{KeyNormalizer, Keyed};
pub use normalizer::{CoercionFailure, FieldNormalizer};
pub use orchestrator::{
    DatasetFailure, IntegrationOrchestrator, IntegrationRun, RawSnapshots, RunReport,
};
pub use outlier_filter::{OutlierFilter, OutlierRules, ReferenceDate};
pub use report::{CleaningReport, Stage, StageReport};
pub use row_exploder::{FuelExpansion, RowExploder};
pub use validator::{CriticalFieldValidator, CriticalFields};

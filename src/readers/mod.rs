pub mod concurrent_reader;
pub mod table_reader;

pub use concurrent_reader::{ConcurrentReader, SnapshotPaths};
pub use table_reader::{HeaderMode, TableReader};

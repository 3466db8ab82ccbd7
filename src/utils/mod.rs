pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::default_output_dir;
pub use progress::ProgressReporter;

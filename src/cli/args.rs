use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::writers::OutputFormat;

#[derive(Parser)]
#[command(name = "vehicle-data-processor")]
#[command(about = "Clean and integrate EPA vehicle, NHTSA complaint and DOE fuel station snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "TOML settings file (overridden by VDP_* variables)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the three snapshots, integrate them and write every output table
    Process {
        #[arg(short, long, help = "Directory holding the raw snapshot files")]
        raw_dir: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output directory [default: output/vehicle-analysis-{YYMMDD}]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(short, long)]
        compression: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long)]
        max_workers: Option<usize>,
    },

    /// Run cleaning and integration in memory and report integrity
    Validate {
        #[arg(short, long, help = "Directory holding the raw snapshot files")]
        raw_dir: Option<PathBuf>,

        #[arg(long)]
        max_workers: Option<usize>,
    },

    /// Display information about a Parquet output table
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_flags() {
        let cli = Cli::try_parse_from([
            "vehicle-data-processor",
            "--verbose",
            "process",
            "--raw-dir",
            "data/raw",
            "--format",
            "csv",
            "--validate-only",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Process {
                raw_dir,
                format,
                validate_only,
                output,
                ..
            } => {
                assert_eq!(raw_dir, Some(PathBuf::from("data/raw")));
                assert_eq!(format, Some(OutputFormat::Csv));
                assert!(validate_only);
                assert!(output.is_none());
            }
            _ => panic!("expected process command"),
        }
    }
}

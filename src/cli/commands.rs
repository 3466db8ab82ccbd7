use std::path::PathBuf;
use tracing::{info, warn};

use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::logging::init_logging;
use crate::processors::{IntegrationOrchestrator, IntegrationRun, IntegrityChecker, IntegrityReport};
use crate::readers::ConcurrentReader;
use crate::utils::filename::default_output_dir;
use crate::utils::progress::ProgressReporter;
use crate::writers::{OutputWriter, ParquetWriter};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let mut settings = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            raw_dir,
            output,
            format,
            compression,
            validate_only,
            max_workers,
        } => {
            if let Some(dir) = raw_dir {
                settings.raw_dir = dir;
            }
            if let Some(dir) = output {
                settings.output_dir = Some(dir);
            }
            if let Some(format) = format {
                settings.format = format;
            }
            if let Some(compression) = compression {
                settings.compression = compression;
            }
            if let Some(workers) = max_workers {
                settings.max_workers = workers;
            }

            // Reject a bad codec before spending time on the snapshots
            let parquet = ParquetWriter::new()
                .with_compression(&settings.compression)?
                .with_row_group_size(settings.row_group_size);

            println!("Processing vehicle datasets...");
            println!("Raw directory: {}", settings.raw_dir.display());
            println!("Workers: {}", settings.max_workers);

            let run = integrate(&settings).await?;
            print_reports(&run, &settings);

            if validate_only {
                println!("Validation complete - no output written");
                return finish(&run);
            }

            let output_dir: PathBuf = settings
                .output_dir
                .clone()
                .unwrap_or_else(|| default_output_dir(run.reference_date));

            let writer = OutputWriter::new(output_dir)
                .with_format(settings.format)
                .with_parquet_writer(parquet);

            let written = writer.write_run(&run)?;
            println!("\nWrote {} files to {}", written.len(), writer.root().display());
            for path in &written {
                println!("  {}", path.display());
            }

            finish(&run)?;
            println!("Processing complete!");
        }

        Commands::Validate {
            raw_dir,
            max_workers,
        } => {
            if let Some(dir) = raw_dir {
                settings.raw_dir = dir;
            }
            if let Some(workers) = max_workers {
                settings.max_workers = workers;
            }

            println!("Validating vehicle datasets...");
            println!("Raw directory: {}", settings.raw_dir.display());

            let run = integrate(&settings).await?;
            let report = print_reports(&run, &settings);

            if report.is_clean() && run.is_complete() {
                println!("✅ All data passed validation checks");
            } else {
                println!("⚠️  Found {} validation issues", report.violations.len());
            }

            finish(&run)?;
        }

        Commands::Info { file, sample } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            println!("\n{}", file_info.summary());
            println!("Columns: {}", file_info.columns.join(", "));

            if sample > 0 {
                println!("\nSample Records (showing up to {} records):", sample);
                match writer.read_sample_rows(&file, sample) {
                    Ok(rows) => {
                        for (i, row) in rows.iter().enumerate() {
                            println!("{}. {}", i + 1, row);
                        }
                    }
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }
    }

    Ok(())
}

async fn integrate(settings: &PipelineConfig) -> Result<IntegrationRun> {
    let progress = ProgressReporter::new_spinner("Reading raw snapshots...", false);

    let paths = settings.snapshot_paths();
    let inputs = ConcurrentReader::new().read_all(&paths).await?;

    let run = IntegrationOrchestrator::new(settings.max_workers).run(inputs, Some(&progress))?;
    progress.println(&format!(
        "Integrated {} tables ({} dataset failures)",
        run.table_rows().len(),
        run.failures.len()
    ));

    Ok(run)
}

fn print_reports(run: &IntegrationRun, settings: &PipelineConfig) -> IntegrityReport {
    for report in run.cleaning_reports() {
        println!("\n{}", report.summary());
    }

    for failure in &run.failures {
        warn!(dataset = %failure.dataset, error = %failure.error, "dataset failed");
        println!("\n❌ {} failed: {}", failure.dataset, failure.error);
    }

    let checker = IntegrityChecker::new().with_min_rows(
        settings.integrity.min_vehicle_rows,
        settings.integrity.min_infrastructure_rows,
        settings.integrity.min_comprehensive_rows,
    );
    let report = checker.check_integrity(run);
    println!("\n{}", checker.generate_summary(&report));

    info!(violations = report.violations.len(), "integrity check finished");
    report
}

/// A run with failed datasets still writes what it can, but exits non-zero.
fn finish(run: &IntegrationRun) -> Result<()> {
    if run.is_complete() {
        Ok(())
    } else {
        Err(ProcessingError::IncompleteRun(run.failures.len()))
    }
}

use crate::analyzers::WindAnalyzer;
use crate::cli::args::{Cli, Commands, WindowArgs};
use crate::config::Settings;
use crate::error::{Result, WindRoseError};
use crate::models::{DateWindow, FilterCriteria, StationMetadata};
use crate::processors::{RoseProcessor, RoseResult, StationOutcome};
use crate::utils::filename::{generate_default_report_filename, generate_default_samples_filename};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{write_samples_file, OutputFormat, ReportSink, RoseReport, TableWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use validator::Validate;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Rose {
            input,
            station,
            locative,
            window,
            format,
            output,
            samples,
            save,
        } => {
            let name = station.unwrap_or_else(|| file_stem(&input));
            let mut station = StationMetadata::new(name, input);
            if let Some(locative) = locative {
                station = station.with_locative_name(locative);
            }
            station.validate()?;
            let criteria = criteria_from(&window)?;

            let (output, samples) = if save {
                (
                    Some(generate_default_report_filename(&station, format.extension())),
                    Some(generate_default_samples_filename(&station)),
                )
            } else {
                (output, samples)
            };

            println!("Building wind rose for {}", station);
            println!("Criteria: {}", criteria.describe());

            let progress =
                ProgressReporter::new_spinner(&format!("Processing {}...", station.name), false);
            let processor = RoseProcessor::new(&settings)?;
            let result =
                tokio::task::spawn_blocking(move || processor.process(&station, &criteria))
                    .await?;
            progress.finish_with_message("Processing complete");
            let result = result?;

            emit(
                &result,
                settings.percent_precision,
                format,
                output.as_deref(),
                samples.as_deref(),
            )?;
        }

        Commands::Batch {
            window,
            format,
            output_dir,
            max_workers,
        } => {
            if settings.stations.is_empty() {
                return Err(WindRoseError::Config(
                    "no stations configured; add [[stations]] to the settings file".to_string(),
                ));
            }
            let criteria = criteria_from(&window)?;
            let stations = settings.stations.clone();

            println!("Processing {} stations", stations.len());
            println!("Criteria: {}", criteria.describe());

            let mut processor = RoseProcessor::new(&settings)?;
            if let Some(workers) = max_workers {
                processor = processor.with_max_workers(workers);
            }

            let outcomes = tokio::task::spawn_blocking(move || {
                let progress =
                    ProgressReporter::new(stations.len() as u64, "Building wind roses...", false);
                processor.process_stations(&stations, &criteria, Some(&progress))
            })
            .await??;

            let summary = write_batch(&outcomes, &output_dir, format, settings.percent_precision);

            println!(
                "Batch complete: {} written, {} without result",
                summary.written, summary.failed
            );
        }

        Commands::Info { input } => {
            println!("Analyzing station archive: {}", input.display());

            let reader = settings.reader()?;
            let stats = WindAnalyzer::new().analyze_file(&reader, &input)?;

            println!("\n{}", stats.detailed_summary());
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BatchSummary {
    written: usize,
    failed: usize,
}

/// Write every successful outcome into `output_dir`. Processing and write
/// failures are reported per station and counted; neither stops the batch.
fn write_batch(
    outcomes: &[StationOutcome],
    output_dir: &Path,
    format: OutputFormat,
    precision: usize,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for outcome in outcomes {
        match &outcome.result {
            Ok(result) => {
                let table = output_dir.join(format!(
                    "{}.{}",
                    result.station.report_stem(),
                    format.extension()
                ));
                let samples = output_dir.join(format!("{}.csv", result.station.image_stem()));

                match emit(result, precision, format, Some(&table), Some(&samples)) {
                    Ok(()) => summary.written += 1,
                    Err(e) => {
                        warn!(station = %outcome.station.name, error = %e, "failed to write report");
                        eprintln!("{}: {}", outcome.station.name, e);
                        summary.failed += 1;
                    }
                }
            }
            Err(e) if e.is_no_data() => {
                println!("{}: {}", outcome.station.name, e);
                summary.failed += 1;
            }
            Err(e) => {
                eprintln!("{}: {}", outcome.station.name, e);
                summary.failed += 1;
            }
        }
    }

    summary
}

fn criteria_from(window: &WindowArgs) -> Result<FilterCriteria> {
    let date_window = DateWindow::parse(&window.from, &window.to, window.synoptic)?;
    Ok(FilterCriteria::new(date_window)
        .with_snow_only(window.snow_only)
        .with_wind_at_least_3(window.wind_at_least_3))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "station".to_string())
}

/// Write the table (file or stdout) and optionally the plot samples.
fn emit(
    result: &RoseResult,
    precision: usize,
    format: OutputFormat,
    output: Option<&Path>,
    samples: Option<&Path>,
) -> Result<()> {
    let mut report = RoseReport::from_result(result, precision);

    if let Some(path) = samples {
        write_samples_file(path, &result.samples)?;
        report = report.with_image_path(image_path_beside(path, result));
        info!(path = %path.display(), "wrote plot samples");
    }

    match output {
        Some(path) => {
            TableWriter::create(path, format)?.write_report(&report)?;
            println!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            TableWriter::new(stdout.lock(), format).write_report(&report)?;
        }
    }

    Ok(())
}

fn image_path_beside(samples: &Path, result: &RoseResult) -> PathBuf {
    let image = format!("{}.png", result.station.image_stem());
    match samples.parent() {
        Some(dir) => dir.join(image),
        None => PathBuf::from(image),
    }
}

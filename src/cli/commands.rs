use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigOverrides, ConvertConfig};
use crate::processors::{Converter, DirectoryInspector, RowGenerator};
use crate::readers::JsonSeriesLoader;
use crate::utils::format_hours;
use crate::writers::{open_database, read_sample_rows, DatabaseInfo};
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Convert {
            input_dir,
            database,
            config,
            index_file,
            extension,
            batch_size,
            meta,
            skip_data,
            no_indices,
            mmap,
            quiet,
        } => {
            let overrides = ConfigOverrides {
                input_dir,
                database,
                index_file,
                extension,
                batch_size,
                meta,
                skip_data,
                no_indices,
                mmap,
            };
            let config = ConvertConfig::load(config.as_deref(), overrides)
                .context("Failed to load configuration")?;

            println!("Converting time series...");
            println!("Input directory: {}", config.input_dir.display());
            println!("Database: {}", config.database.display());
            println!("Batch size: {}", config.batch_size);

            let report = Converter::new(config)
                .with_silent(quiet)
                .run_blocking()
                .await
                .context("Conversion failed")?;

            println!("\n{}", report.summary());
            println!("{}", report.elapsed_message());
        }

        Commands::Inspect {
            input_dir,
            extension,
            index_file,
        } => {
            println!("Inspecting input directory: {}", input_dir.display());

            let summary = tokio::task::spawn_blocking(move || {
                let loader = JsonSeriesLoader::new().with_extension(&extension);
                let mut generator = RowGenerator::new(&input_dir, loader);
                if let Some(name) = index_file {
                    generator = generator.with_index_file(&name);
                }
                DirectoryInspector::inspect(&generator)
            })
            .await?
            .context("Inspection failed")?;

            println!("\n{}", summary.display_summary());

            if summary.length_mismatches.is_empty() {
                println!("✅ All series files are aligned with the timestamp index");
            } else {
                println!(
                    "⚠️  {} series files do not match the timestamp index length",
                    summary.length_mismatches.len()
                );
            }
        }

        Commands::Info { database, sample } => {
            println!("Analyzing database: {}", database.display());

            if !database.exists() {
                return Err(anyhow!("Database not found: {}", database.display()));
            }

            let conn = open_database(&database)
                .with_context(|| format!("Failed to open {}", database.display()))?;
            let info = DatabaseInfo::collect(&conn, &database)?;
            println!("\n{}", info.summary());

            if sample > 0 {
                println!("\nSample Rows (showing up to {} rows):", sample);
                for (i, row) in read_sample_rows(&conn, sample)?.iter().enumerate() {
                    println!(
                        "{}. pollutant {} at station {} on {}: {} (flag {})",
                        i + 1,
                        row.pollutant_id,
                        row.station_id,
                        format_hours(row.timestamp),
                        row.value,
                        row.flag
                    );
                }
            }
        }
    }

    Ok(())
}

/// Structured logging to stderr, optionally mirrored to a file
pub fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("airpy_db={}", log_level)));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

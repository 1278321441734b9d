use crate::config::ConvertConfig;
use crate::error::{ProcessingError, Result};
use crate::processors::{MetaLookup, RowGenerator};
use crate::readers::JsonSeriesLoader;
use crate::utils::progress::ProgressReporter;
use crate::writers::{open_database, BulkLoader, IndexBuilder};
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of one conversion run
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub files: usize,
    pub fact_rows: Option<u64>,
    pub meta_rows: Option<u64>,
    pub coerced_cells: usize,
    pub indices_built: bool,
    pub load_elapsed: Duration,
    pub total_elapsed: Duration,
}

impl LoadReport {
    pub fn summary(&self) -> String {
        let mut summary = format!("Conversion Summary:\n- Series files: {}", self.files);

        if let Some(rows) = self.fact_rows {
            summary.push_str(&format!("\n- Fact rows: {}", rows));
        }
        if let Some(rows) = self.meta_rows {
            summary.push_str(&format!("\n- Annotation rows: {}", rows));
        }
        if self.coerced_cells > 0 {
            summary.push_str(&format!(
                "\n- Skipped cells (neither numeric nor annotation): {}",
                self.coerced_cells
            ));
        }
        summary.push_str(&format!(
            "\n- Indices: {}",
            if self.indices_built { "built" } else { "skipped" }
        ));

        summary
    }

    /// e.g. `Database created in 2 min. 5 sec.`
    pub fn elapsed_message(&self) -> String {
        let seconds = self.total_elapsed.as_secs();
        format!("Database created in {} min. {} sec.", seconds / 60, seconds % 60)
    }
}

/// Runs the whole pipeline: fact load, optional annotation load, indices.
///
/// Everything happens on the calling thread with one connection.
pub struct Converter {
    config: ConvertConfig,
    silent: bool,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            silent: false,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Run on tokio's blocking pool so the async runtime stays responsive
    pub async fn run_blocking(self) -> Result<LoadReport> {
        tokio::task::spawn_blocking(move || self.run()).await?
    }

    pub fn run(&self) -> Result<LoadReport> {
        let started = Instant::now();
        let config = &self.config;

        if !config.input_dir.is_dir() {
            return Err(ProcessingError::MissingData(format!(
                "Input directory not found: {}",
                config.input_dir.display()
            )));
        }

        let series_loader = JsonSeriesLoader::new()
            .with_extension(config.extension())
            .with_mmap(config.use_mmap);
        let generator = RowGenerator::new(&config.input_dir, series_loader)
            .with_index_file(&config.index_file_name());

        let mut conn = open_database(&config.database)?;
        let loader = BulkLoader::new().with_batch_size(config.batch_size);
        let mut report = LoadReport::default();

        info!(
            "Converting {} into {}",
            config.input_dir.display(),
            config.database.display()
        );

        if config.load_data {
            let progress = ProgressReporter::new(0, "Creating Data", self.silent);
            let mut rows = generator.fact_rows(Some(&progress))?;
            let inserted = loader.load(&mut conn, &mut rows)?;
            progress.finish_with_message(&format!("{} rows", inserted));

            report.files = rows.stats().files_processed;
            report.coerced_cells = rows.stats().coerced_cells;
            report.fact_rows = Some(inserted);
        }

        if config.load_meta {
            let lookup = MetaLookup::load(&conn)?;
            info!("Loaded {} annotation codes", lookup.len());

            let progress = ProgressReporter::new(0, "Creating Meta", self.silent);
            let mut rows = generator.meta_rows(&lookup, Some(&progress))?;
            let inserted = loader.load(&mut conn, &mut rows)?;
            progress.finish_with_message(&format!("{} rows", inserted));

            if !config.load_data {
                report.files = rows.stats().files_processed;
                report.coerced_cells = rows.stats().coerced_cells;
            }
            report.meta_rows = Some(inserted);
        }

        report.load_elapsed = started.elapsed();
        info!("Load completed in {:.1}s", report.load_elapsed.as_secs_f64());

        if config.build_indices {
            info!("Creating indices...");
            IndexBuilder::build_all(&conn)?;
            report.indices_built = true;
        }

        report.total_elapsed = started.elapsed();

        Ok(report)
    }
}

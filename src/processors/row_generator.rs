use crate::error::{ProcessingError, Result};
use crate::models::{FactRow, MetaRow, SeriesId};
use crate::processors::meta_resolver::MetaLookup;
use crate::processors::value_splitter::{split_series, SplitSeries};
use crate::readers::{discover_series, SeriesFile, SeriesLoader};
use crate::utils::constants::DEFAULT_INDEX_STEM;
use crate::utils::filename::index_file_name;
use crate::utils::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Counters collected while a row stream is consumed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub files_total: usize,
    pub files_processed: usize,
    pub cells_seen: usize,
    pub coerced_cells: usize,
}

/// Turns an input directory into lazy fact and meta row streams.
///
/// Each call to [`RowGenerator::fact_rows`] or [`RowGenerator::meta_rows`]
/// re-reads the timestamp index and re-scans the directory; the returned
/// iterator then loads one series file at a time.
pub struct RowGenerator<L: SeriesLoader> {
    input_dir: PathBuf,
    index_file_name: String,
    loader: L,
}

impl<L: SeriesLoader> RowGenerator<L> {
    pub fn new(input_dir: &Path, loader: L) -> Self {
        let index_file_name = index_file_name(DEFAULT_INDEX_STEM, loader.extension());
        Self {
            input_dir: input_dir.to_path_buf(),
            index_file_name,
            loader,
        }
    }

    pub fn with_index_file(mut self, index_file_name: &str) -> Self {
        self.index_file_name = index_file_name.to_string();
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn index_path(&self) -> PathBuf {
        self.input_dir.join(&self.index_file_name)
    }

    /// Read the shared timestamp index
    pub fn load_timestamps(&self) -> Result<Vec<i64>> {
        let path = self.index_path();
        if !path.exists() {
            return Err(ProcessingError::MissingData(format!(
                "Timestamp index not found: {}",
                path.display()
            )));
        }
        self.loader.load_index(&path)
    }

    /// Series files of the input directory in file name order
    pub fn series_files(&self) -> Result<Vec<SeriesFile>> {
        discover_series(&self.input_dir, self.loader.extension(), &self.index_file_name)
    }

    /// Lazy stream of fact rows over every series file
    pub fn fact_rows<'a>(&'a self, progress: Option<&'a ProgressReporter>) -> Result<FactRows<'a, L>> {
        Ok(FactRows {
            cursor: self.cursor(progress)?,
        })
    }

    /// Lazy stream of meta rows, resolving annotation names through `lookup`
    pub fn meta_rows<'a>(
        &'a self,
        lookup: &'a MetaLookup,
        progress: Option<&'a ProgressReporter>,
    ) -> Result<MetaRows<'a, L>> {
        Ok(MetaRows {
            cursor: self.cursor(progress)?,
            lookup,
        })
    }

    fn cursor<'a>(&'a self, progress: Option<&'a ProgressReporter>) -> Result<SeriesCursor<'a, L>> {
        let timestamps = self.load_timestamps()?;
        let files = self.series_files()?;

        debug!(
            "Scanned {}: {} series files, {} timestamps",
            self.input_dir.display(),
            files.len(),
            timestamps.len()
        );

        if let Some(p) = progress {
            p.set_length(files.len() as u64);
        }

        Ok(SeriesCursor {
            loader: &self.loader,
            stats: GenerationStats {
                files_total: files.len(),
                ..GenerationStats::default()
            },
            timestamps,
            files: files.into_iter(),
            current: None,
            progress,
            failed: false,
        })
    }
}

struct ActiveSeries {
    id: SeriesId,
    split: SplitSeries,
    position: usize,
}

/// Walks (series, position) pairs across all files, one file in memory
struct SeriesCursor<'a, L: SeriesLoader> {
    loader: &'a L,
    timestamps: Vec<i64>,
    files: std::vec::IntoIter<SeriesFile>,
    current: Option<ActiveSeries>,
    progress: Option<&'a ProgressReporter>,
    stats: GenerationStats,
    failed: bool,
}

impl<L: SeriesLoader> SeriesCursor<'_, L> {
    /// Advance to the next position for which `pick` yields a row
    fn next_matching<T, F>(&mut self, mut pick: F) -> Option<Result<T>>
    where
        F: FnMut(SeriesId, i64, &SplitSeries, usize) -> Option<T>,
    {
        loop {
            if self.failed {
                return None;
            }

            if let Some(active) = self.current.as_mut() {
                while active.position < active.split.len() {
                    let position = active.position;
                    active.position += 1;
                    if let Some(row) = pick(active.id, self.timestamps[position], &active.split, position) {
                        return Some(Ok(row));
                    }
                }
                self.finish_current();
            }

            let file = self.files.next()?;
            if let Err(e) = self.open(file) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }

    fn open(&mut self, file: SeriesFile) -> Result<()> {
        if let Some(p) = self.progress {
            p.set_message(&file.file_name);
        }

        let cells = self.loader.load_cells(&file.path)?;
        if cells.len() != self.timestamps.len() {
            return Err(ProcessingError::LengthMismatch {
                file: file.file_name,
                expected: self.timestamps.len(),
                actual: cells.len(),
            });
        }

        let split = split_series(cells);
        if split.coerced > 0 {
            warn!(
                "{}: {} cells were neither numeric nor annotations and were skipped",
                file.file_name, split.coerced
            );
        }

        debug!(
            "Loaded {} (pollutant {}, station {}): {} numeric, {} annotated",
            file.file_name,
            file.id.pollutant_id,
            file.id.station_id,
            split.numeric_count(),
            split.annotation_count()
        );

        self.stats.cells_seen += split.len();
        self.stats.coerced_cells += split.coerced;
        self.current = Some(ActiveSeries {
            id: file.id,
            split,
            position: 0,
        });

        Ok(())
    }

    fn finish_current(&mut self) {
        if self.current.take().is_some() {
            self.stats.files_processed += 1;
            if let Some(p) = self.progress {
                p.increment(1);
            }
        }
    }
}

/// Fact rows for every numeric cell, in file name then index order
pub struct FactRows<'a, L: SeriesLoader> {
    cursor: SeriesCursor<'a, L>,
}

impl<L: SeriesLoader> FactRows<'_, L> {
    pub fn stats(&self) -> &GenerationStats {
        &self.cursor.stats
    }
}

impl<L: SeriesLoader> Iterator for FactRows<'_, L> {
    type Item = Result<FactRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_matching(|id, timestamp, split, position| {
            split
                .fact_value(position)
                .map(|value| FactRow::new(id, timestamp, value))
        })
    }
}

/// Meta rows for every annotated cell, in file name then index order
pub struct MetaRows<'a, L: SeriesLoader> {
    cursor: SeriesCursor<'a, L>,
    lookup: &'a MetaLookup,
}

impl<L: SeriesLoader> MetaRows<'_, L> {
    pub fn stats(&self) -> &GenerationStats {
        &self.cursor.stats
    }
}

impl<L: SeriesLoader> Iterator for MetaRows<'_, L> {
    type Item = Result<MetaRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let lookup = self.lookup;
        self.cursor.next_matching(|id, timestamp, split, position| {
            split
                .annotation(position)
                .map(|name| MetaRow::new(id, timestamp, lookup.resolve(name)))
        })
    }
}

use crate::error::Result;
use crate::processors::value_splitter::split_series;
use crate::processors::RowGenerator;
use crate::readers::SeriesLoader;
use crate::utils::format_hours;
use std::collections::{BTreeMap, BTreeSet};

/// What an input directory would produce, without touching a database
#[derive(Debug, Clone, Default)]
pub struct InputSummary {
    pub series_files: usize,
    pub pollutants: BTreeSet<i64>,
    pub stations: BTreeSet<i64>,
    pub timestamps: usize,
    pub time_range: Option<(i64, i64)>,
    pub numeric_cells: usize,
    pub annotation_cells: usize,
    pub coerced_cells: usize,
    pub annotations: BTreeMap<String, usize>,
    pub length_mismatches: Vec<String>,
}

impl InputSummary {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Input Directory:\n  Series Files: {}\n  Pollutants: {}\n  Stations: {}\n  Timestamps: {}\n",
            self.series_files,
            self.pollutants.len(),
            self.stations.len(),
            self.timestamps
        );

        if let Some((start, end)) = self.time_range {
            summary.push_str(&format!(
                "  Time Range: {} to {}\n",
                format_hours(start),
                format_hours(end)
            ));
        }

        summary.push_str(&format!(
            "  Numeric Cells: {}\n  Annotated Cells: {}\n",
            self.numeric_cells, self.annotation_cells
        ));

        if self.coerced_cells > 0 {
            summary.push_str(&format!("  Unusable Cells: {}\n", self.coerced_cells));
        }

        if !self.annotations.is_empty() {
            summary.push_str("  Annotations:\n");
            for (name, count) in &self.annotations {
                summary.push_str(&format!("    {}: {}\n", name, count));
            }
        }

        if !self.length_mismatches.is_empty() {
            summary.push_str("  Files not aligned with the index:\n");
            for file in &self.length_mismatches {
                summary.push_str(&format!("    {}\n", file));
            }
        }

        summary
    }

    /// Rows a conversion would write to the fact table
    pub fn expected_fact_rows(&self) -> usize {
        self.numeric_cells
    }
}

pub struct DirectoryInspector;

impl DirectoryInspector {
    /// Scan every series file once and tally its cells
    pub fn inspect<L: SeriesLoader>(generator: &RowGenerator<L>) -> Result<InputSummary> {
        let timestamps = generator.load_timestamps()?;
        let files = generator.series_files()?;

        let mut summary = InputSummary {
            series_files: files.len(),
            timestamps: timestamps.len(),
            time_range: timestamps
                .iter()
                .min()
                .copied()
                .zip(timestamps.iter().max().copied()),
            ..InputSummary::default()
        };

        for file in files {
            summary.pollutants.insert(file.id.pollutant_id);
            summary.stations.insert(file.id.station_id);

            let cells = generator.loader().load_cells(&file.path)?;
            if cells.len() != timestamps.len() {
                summary.length_mismatches.push(file.file_name.clone());
            }

            let split = split_series(cells);
            summary.numeric_cells += split.numeric_count();
            summary.annotation_cells += split.annotation_count();
            summary.coerced_cells += split.coerced;
            for name in split.annotations.into_iter().flatten() {
                *summary.annotations.entry(name).or_default() += 1;
            }
        }

        Ok(summary)
    }
}

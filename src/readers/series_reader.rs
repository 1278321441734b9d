use crate::error::{ProcessingError, Result};
use crate::models::{Cell, SeriesId};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_EXTENSION};
use crate::utils::filename::parse_series_id;
use memmap2::Mmap;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Reads the serialized per-file payloads.
///
/// The on-disk format is opaque to the rest of the pipeline; everything
/// downstream only sees a timestamp sequence and a cell sequence.
pub trait SeriesLoader {
    /// File extension (without the dot) of index and series files
    fn extension(&self) -> &str;

    /// Load the shared timestamp index
    fn load_index(&self, path: &Path) -> Result<Vec<i64>>;

    /// Load one series payload
    fn load_cells(&self, path: &Path) -> Result<Vec<Cell>>;
}

/// Loader for JSON arrays: `[100, 200, 300]` for the index and
/// `[1.5, "missing", 2.5]` for a series.
pub struct JsonSeriesLoader {
    extension: String,
    use_mmap: bool,
}

impl JsonSeriesLoader {
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            use_mmap: false,
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    fn read_array<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if self.use_mmap {
            self.read_array_mmap(path)
        } else {
            self.read_array_buffered(path)
        }
    }

    fn read_array_buffered<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        Ok(serde_json::from_reader(reader)?)
    }

    fn read_array_mmap<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let file = File::open(path)?;
        // Empty files cannot be mapped on every platform
        if file.metadata()?.len() == 0 {
            return Err(ProcessingError::InvalidFormat(format!(
                "Empty payload file: {}",
                path.display()
            )));
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(serde_json::from_slice(&mmap)?)
    }
}

impl Default for JsonSeriesLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesLoader for JsonSeriesLoader {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn load_index(&self, path: &Path) -> Result<Vec<i64>> {
        self.read_array(path)
    }

    fn load_cells(&self, path: &Path) -> Result<Vec<Cell>> {
        self.read_array(path)
    }
}

/// A discovered series file and the identifiers decoded from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFile {
    pub path: PathBuf,
    pub file_name: String,
    pub id: SeriesId,
}

/// List the series files of an input directory, sorted by file name.
///
/// Every file (or symlink to a file) carrying `extension` other than
/// `index_file_name` is a series file. Hidden files are ignored. A name that
/// does not decode to an identifier pair fails the whole scan.
pub fn discover_series(dir: &Path, extension: &str, index_file_name: &str) -> Result<Vec<SeriesFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') || file_name == index_file_name {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        // Follows symlinks; dangling links surface as an io error
        if !std::fs::metadata(&path)?.is_file() {
            continue;
        }

        let id = parse_series_id(&path)?;
        files.push(SeriesFile { path, file_name, id });
    }

    // Directory listing order is platform dependent
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

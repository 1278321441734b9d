//! Conversion settings.
//!
//! Settings are layered: built-in defaults, then an optional config file
//! (TOML, JSON, ...), then `AIRPY_*` environment variables, then command
//! line flags.

use crate::error::Result;
use crate::utils::constants::{DEFAULT_BATCH_SIZE, DEFAULT_EXTENSION, DEFAULT_INDEX_STEM};
use crate::utils::filename::index_file_name;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

pub const ENV_PREFIX: &str = "AIRPY";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConvertConfig {
    /// Directory holding the index file and the series files
    pub input_dir: PathBuf,

    /// Destination SQLite database (schema must already exist)
    pub database: PathBuf,

    /// Timestamp index file name; defaults to `index.{extension}`
    #[validate(length(min = 1))]
    pub index_file: Option<String>,

    #[validate(length(min = 1))]
    pub extension: String,

    /// Rows per multi-row INSERT
    #[validate(range(min = 1, max = 6000))]
    pub batch_size: usize,

    pub load_data: bool,
    pub load_meta: bool,
    pub build_indices: bool,
    pub use_mmap: bool,
}

/// Values given on the command line; `None`/`false` leaves lower layers alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub index_file: Option<String>,
    pub extension: Option<String>,
    pub batch_size: Option<usize>,
    pub meta: bool,
    pub skip_data: bool,
    pub no_indices: bool,
    pub mmap: bool,
}

impl ConvertConfig {
    pub fn load(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("input_dir", "pkl")?
            .set_default("database", "airpy.db")?
            .set_default("extension", DEFAULT_EXTENSION)?
            .set_default("batch_size", DEFAULT_BATCH_SIZE as i64)?
            .set_default("load_data", true)?
            .set_default("load_meta", false)?
            .set_default("build_indices", true)?
            .set_default("use_mmap", false)?;

        if let Some(path) = config_file {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        if let Some(input_dir) = overrides.input_dir {
            builder = builder.set_override("input_dir", input_dir.to_string_lossy().into_owned())?;
        }
        if let Some(database) = overrides.database {
            builder = builder.set_override("database", database.to_string_lossy().into_owned())?;
        }
        if let Some(index_file) = overrides.index_file {
            builder = builder.set_override("index_file", index_file)?;
        }
        if let Some(extension) = overrides.extension {
            builder = builder.set_override("extension", extension)?;
        }
        if let Some(batch_size) = overrides.batch_size {
            builder = builder.set_override("batch_size", batch_size as i64)?;
        }
        if overrides.meta {
            builder = builder.set_override("load_meta", true)?;
        }
        if overrides.skip_data {
            builder = builder.set_override("load_data", false)?;
        }
        if overrides.no_indices {
            builder = builder.set_override("build_indices", false)?;
        }
        if overrides.mmap {
            builder = builder.set_override("use_mmap", true)?;
        }

        let config: ConvertConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Extension without a leading dot
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    pub fn index_file_name(&self) -> String {
        self.index_file
            .clone()
            .unwrap_or_else(|| index_file_name(DEFAULT_INDEX_STEM, self.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = ConvertConfig::load(None, ConfigOverrides::default())?;

        assert_eq!(config.input_dir, PathBuf::from("pkl"));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.load_data);
        assert!(!config.load_meta);
        assert!(config.build_indices);
        assert_eq!(config.index_file_name(), "index.json");

        Ok(())
    }

    #[test]
    fn test_file_then_overrides() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("airpy.toml");
        fs::write(
            &path,
            "input_dir = \"/srv/pkl\"\nbatch_size = 250\nload_meta = true\nextension = \".dat\"\n",
        )?;

        let config = ConvertConfig::load(
            Some(&path),
            ConfigOverrides {
                batch_size: Some(500),
                no_indices: true,
                ..ConfigOverrides::default()
            },
        )?;

        assert_eq!(config.input_dir, PathBuf::from("/srv/pkl"));
        assert_eq!(config.batch_size, 500);
        assert!(config.load_meta);
        assert!(!config.build_indices);
        assert_eq!(config.extension(), "dat");
        assert_eq!(config.index_file_name(), "index.dat");

        Ok(())
    }

    #[test]
    fn test_batch_size_out_of_range() {
        let result = ConvertConfig::load(
            None,
            ConfigOverrides {
                batch_size: Some(0),
                ..ConfigOverrides::default()
            },
        );
        assert!(matches!(result, Err(ProcessingError::Validation(_))));

        let result = ConvertConfig::load(
            None,
            ConfigOverrides {
                batch_size: Some(10_000),
                ..ConfigOverrides::default()
            },
        );
        assert!(matches!(result, Err(ProcessingError::Validation(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConvertConfig::load(Some(Path::new("/nonexistent/airpy.toml")), ConfigOverrides::default());
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }
}

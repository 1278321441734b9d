use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid series file name '{name}': expected '{{pollutant_id}}_{{station_id}}'")]
    InvalidFileName { name: String },

    #[error("Series {file} has {actual} cells but the timestamp index has {expected}")]
    LengthMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    #[error("Row for table '{table}' has {actual} values, expected {expected}")]
    RowShape {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Table '{0}' does not exist in the destination database")]
    MissingTable(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub mod series_reader;

pub use series_reader::{discover_series, JsonSeriesLoader, SeriesFile, SeriesLoader};

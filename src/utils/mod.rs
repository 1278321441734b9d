pub mod constants;
pub mod filename;
pub mod progress;
pub mod time;

pub use constants::*;
pub use filename::{index_file_name, parse_series_id, series_file_name};
pub use progress::ProgressReporter;
pub use time::{format_hours, hours_to_datetime};

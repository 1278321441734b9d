/// Table names
pub const DATA_TABLE: &str = "data";
pub const DATA_META_TABLE: &str = "data_meta";
pub const META_TABLE: &str = "meta";

/// Column layout of the fact and annotation tables
pub const DATA_COLUMNS: &[&str] = &["pol", "sta", "date", "value", "flag"];
pub const DATA_META_COLUMNS: &[&str] = &["pol", "sta", "date", "code"];

/// Index names on the fact table
pub const POL_INDEX: &str = "pol_index";
pub const DATE_INDEX: &str = "date_index";
pub const STA_INDEX: &str = "sta_index";

/// File names
pub const DEFAULT_INDEX_STEM: &str = "index";
pub const DEFAULT_EXTENSION: &str = "json";

/// Timestamps count hours from 2008-01-01T00:00:00Z
pub const EPOCH_UNIX_SECONDS: i64 = 1_199_145_600;
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Meta code returned for annotation names missing from the lookup table
pub const UNKNOWN_META_CODE: i64 = 0;

/// Processing defaults
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// SQLite caps bound parameters per statement at 32766
pub const MAX_BATCH_SIZE: usize = 6000;

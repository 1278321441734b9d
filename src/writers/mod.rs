pub mod index_builder;
pub mod sqlite_loader;

pub use index_builder::{IndexBuilder, IndexSpec, DATA_INDICES};
pub use sqlite_loader::{open_database, read_sample_rows, BulkLoader, DatabaseInfo, TableRow};

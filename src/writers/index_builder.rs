use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DATA_TABLE, DATE_INDEX, POL_INDEX, STA_INDEX};
use crate::writers::sqlite_loader::table_exists;
use rusqlite::Connection;
use std::time::Instant;
use tracing::info;

/// One secondary index on the fact table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl IndexSpec {
    pub fn create_statement(&self, table: &str) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            self.name,
            table,
            self.columns.join(", ")
        )
    }
}

/// Lookup by pollutant, station and date; by date; by station
pub const DATA_INDICES: [IndexSpec; 3] = [
    IndexSpec {
        name: POL_INDEX,
        columns: &["pol", "sta", "date"],
    },
    IndexSpec {
        name: DATE_INDEX,
        columns: &["date"],
    },
    IndexSpec {
        name: STA_INDEX,
        columns: &["sta"],
    },
];

/// Builds the fact table's indices once the bulk load has committed.
///
/// Each index is its own statement, so a failure part way leaves the data
/// and any earlier indices in place.
pub struct IndexBuilder;

impl IndexBuilder {
    pub fn build_all(conn: &Connection) -> Result<()> {
        if !table_exists(conn, DATA_TABLE)? {
            return Err(ProcessingError::MissingTable(DATA_TABLE.to_string()));
        }

        for index in &DATA_INDICES {
            let started = Instant::now();
            conn.execute_batch(&index.create_statement(DATA_TABLE))?;
            info!(
                "Created index {} on {} ({}) in {:.1}s",
                index.name,
                DATA_TABLE,
                index.columns.join(", "),
                started.elapsed().as_secs_f64()
            );
        }

        Ok(())
    }
}

use crate::error::{ProcessingError, Result};
use crate::models::{FactRow, MetaRow};
use crate::processors::MetaLookup;
use crate::utils::constants::{
    DATA_COLUMNS, DATA_META_COLUMNS, DATA_META_TABLE, DATA_TABLE, DATE_INDEX, DEFAULT_BATCH_SIZE,
    META_TABLE, POL_INDEX, STA_INDEX,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Transaction};
use std::path::Path;
use tracing::{debug, info};

/// A record with a fixed destination table and column layout
pub trait TableRow {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Append this row's column values, in column order
    fn bind(&self, values: &mut Vec<Value>);
}

impl TableRow for FactRow {
    const TABLE: &'static str = DATA_TABLE;
    const COLUMNS: &'static [&'static str] = DATA_COLUMNS;

    fn bind(&self, values: &mut Vec<Value>) {
        values.push(Value::Integer(self.pollutant_id));
        values.push(Value::Integer(self.station_id));
        values.push(Value::Integer(self.timestamp));
        values.push(Value::Real(self.value));
        values.push(Value::Integer(self.flag));
    }
}

impl TableRow for MetaRow {
    const TABLE: &'static str = DATA_META_TABLE;
    const COLUMNS: &'static [&'static str] = DATA_META_COLUMNS;

    fn bind(&self, values: &mut Vec<Value>) {
        values.push(Value::Integer(self.pollutant_id));
        values.push(Value::Integer(self.station_id));
        values.push(Value::Integer(self.timestamp));
        values.push(Value::Integer(self.code));
    }
}

/// Open an existing destination database; never creates a new file
pub fn open_database(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(ProcessingError::MissingData(format!(
            "Database not found: {}",
            path.display()
        )));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn index_exists(conn: &Connection, index: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
        params![index],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn row_count(conn: &Connection, table: &str) -> Result<i64> {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?)
}

/// Streams rows into their table with batched multi-row inserts.
///
/// A load runs in a single transaction: either every row of the stream is
/// committed or none is.
pub struct BulkLoader {
    batch_size: usize,
}

impl BulkLoader {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Insert every row of `rows` and return how many were written
    pub fn load<R, I>(&self, conn: &mut Connection, rows: I) -> Result<u64>
    where
        R: TableRow,
        I: IntoIterator<Item = Result<R>>,
    {
        if !table_exists(conn, R::TABLE)? {
            return Err(ProcessingError::MissingTable(R::TABLE.to_string()));
        }

        let arity = R::COLUMNS.len();
        let tx = conn.transaction()?;
        let mut buffer: Vec<Value> = Vec::with_capacity(self.batch_size * arity);
        let mut pending = 0usize;
        let mut total = 0u64;

        // Returning early drops `tx`, which rolls the whole load back
        for row in rows {
            let row = row?;

            let before = buffer.len();
            row.bind(&mut buffer);
            let actual = buffer.len() - before;
            if actual != arity {
                return Err(ProcessingError::RowShape {
                    table: R::TABLE,
                    expected: arity,
                    actual,
                });
            }

            pending += 1;
            if pending == self.batch_size {
                Self::flush(&tx, R::TABLE, arity, pending, &mut buffer)?;
                total += pending as u64;
                pending = 0;
            }
        }

        if pending > 0 {
            Self::flush(&tx, R::TABLE, arity, pending, &mut buffer)?;
            total += pending as u64;
        }

        tx.commit()?;
        info!("Inserted {} rows into {}", total, R::TABLE);

        Ok(total)
    }

    fn flush(
        tx: &Transaction<'_>,
        table: &str,
        arity: usize,
        rows: usize,
        buffer: &mut Vec<Value>,
    ) -> Result<()> {
        let sql = insert_statement(table, arity, rows);
        let mut stmt = tx.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(buffer.drain(..)))?;
        debug!("Flushed {} rows into {}", rows, table);
        Ok(())
    }
}

impl Default for BulkLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `INSERT INTO t VALUES (?,?),(?,?)` for `rows` rows of `arity` columns
fn insert_statement(table: &str, arity: usize, rows: usize) -> String {
    let placeholders = vec!["?"; arity].join(",");
    let tuple = format!("({})", placeholders);
    format!("INSERT INTO {} VALUES {}", table, vec![tuple; rows].join(","))
}

/// Snapshot of a converted database
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub data_rows: i64,
    pub meta_rows: Option<i64>,
    pub meta_codes: Option<i64>,
    pub indices: Vec<(&'static str, bool)>,
    pub date_range: Option<(i64, i64)>,
    /// `(code, name, rows)` per code used in the annotation table
    pub annotation_counts: Vec<(i64, Option<String>, i64)>,
    pub file_size: u64,
}

impl DatabaseInfo {
    pub fn collect(conn: &Connection, path: &Path) -> Result<Self> {
        if !table_exists(conn, DATA_TABLE)? {
            return Err(ProcessingError::MissingTable(DATA_TABLE.to_string()));
        }

        let optional_count = |table: &str| -> Result<Option<i64>> {
            if table_exists(conn, table)? {
                Ok(Some(row_count(conn, table)?))
            } else {
                Ok(None)
            }
        };

        let mut indices = Vec::new();
        for index in [POL_INDEX, DATE_INDEX, STA_INDEX] {
            indices.push((index, index_exists(conn, index)?));
        }

        let date_range = conn
            .query_row(
                &format!("SELECT MIN(date), MAX(date) FROM {}", DATA_TABLE),
                [],
                |row| Ok((row.get::<_, Option<i64>>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?
            .and_then(|(min, max)| min.zip(max));

        let annotation_counts = if table_exists(conn, DATA_META_TABLE)? && table_exists(conn, META_TABLE)? {
            annotation_counts(conn, &MetaLookup::load(conn)?)?
        } else {
            Vec::new()
        };

        Ok(Self {
            data_rows: row_count(conn, DATA_TABLE)?,
            meta_rows: optional_count(DATA_META_TABLE)?,
            meta_codes: optional_count(META_TABLE)?,
            indices,
            date_range,
            annotation_counts,
            file_size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        })
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Database Summary:\n\
            - Fact rows ({}): {}\n\
            - File size: {:.2} MB",
            DATA_TABLE,
            self.data_rows,
            self.file_size as f64 / 1_048_576.0
        );

        if let Some(meta_rows) = self.meta_rows {
            summary.push_str(&format!("\n- Annotation rows ({}): {}", DATA_META_TABLE, meta_rows));
        }
        if let Some(meta_codes) = self.meta_codes {
            summary.push_str(&format!("\n- Annotation codes ({}): {}", META_TABLE, meta_codes));
        }
        if let Some((start, end)) = self.date_range {
            summary.push_str(&format!(
                "\n- Date range: {} to {}",
                crate::utils::format_hours(start),
                crate::utils::format_hours(end)
            ));
        }

        if !self.annotation_counts.is_empty() {
            summary.push_str("\n- Annotations:");
            for (code, name, rows) in &self.annotation_counts {
                summary.push_str(&format!(
                    "\n    {} ({}): {}",
                    name.as_deref().unwrap_or("unknown"),
                    code,
                    rows
                ));
            }
        }

        summary.push_str("\n- Indices:");
        for (name, present) in &self.indices {
            summary.push_str(&format!(
                "\n    {}: {}",
                name,
                if *present { "present" } else { "missing" }
            ));
        }

        summary
    }
}

fn annotation_counts(conn: &Connection, lookup: &MetaLookup) -> Result<Vec<(i64, Option<String>, i64)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT code, COUNT(*) FROM {} GROUP BY code ORDER BY code",
        DATA_META_TABLE
    ))?;
    let counts = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(counts
        .into_iter()
        .map(|(code, rows)| (code, lookup.name_of(code).map(str::to_string), rows))
        .collect())
}

/// Read the first `limit` fact rows in storage order
pub fn read_sample_rows(conn: &Connection, limit: usize) -> Result<Vec<FactRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT pol, sta, date, value, flag FROM {} LIMIT ?1",
        DATA_TABLE
    ))?;
    let rows = stmt
        .query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
            Ok(FactRow {
                pollutant_id: row.get(0)?,
                station_id: row.get(1)?,
                timestamp: row.get(2)?,
                value: row.get(3)?,
                flag: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

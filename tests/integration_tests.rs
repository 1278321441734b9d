use airpy_db::config::{ConfigOverrides, ConvertConfig};
use airpy_db::models::{FactRow, MetaRow, SeriesId};
use airpy_db::processors::{Converter, MetaLookup, RowGenerator};
use airpy_db::readers::JsonSeriesLoader;
use airpy_db::utils::series_file_name;
use airpy_db::writers::{open_database, BulkLoader, IndexBuilder};
use airpy_db::ProcessingError;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE meta (id INTEGER, name TEXT);
    CREATE TABLE data (pol INTEGER, sta INTEGER, date INTEGER, value REAL, flag INTEGER);
    CREATE TABLE data_meta (pol INTEGER, sta INTEGER, date INTEGER, code INTEGER);
    INSERT INTO meta VALUES (1, 'ok'), (2, 'missing');
";

fn create_database(path: &Path) {
    let conn = Connection::open(path).expect("Failed to create database");
    conn.execute_batch(SCHEMA).expect("Failed to create schema");
}

fn write_input(dir: &Path, index: &str, series: &[(SeriesId, &str)]) {
    fs::write(dir.join("index.json"), index).expect("Failed to write index");
    for (id, payload) in series {
        fs::write(dir.join(series_file_name(*id, "json")), payload).expect("Failed to write series");
    }
}

fn config_for(input: &Path, database: &Path, meta: bool) -> ConvertConfig {
    ConvertConfig::load(
        None,
        ConfigOverrides {
            input_dir: Some(input.to_path_buf()),
            database: Some(database.to_path_buf()),
            meta,
            ..ConfigOverrides::default()
        },
    )
    .expect("Failed to build config")
}

fn fact_rows(conn: &Connection) -> Vec<FactRow> {
    let mut stmt = conn
        .prepare("SELECT pol, sta, date, value, flag FROM data ORDER BY pol, sta, date")
        .unwrap();
    stmt.query_map([], |row| {
        Ok(FactRow {
            pollutant_id: row.get(0)?,
            station_id: row.get(1)?,
            timestamp: row.get(2)?,
            value: row.get(3)?,
            flag: row.get(4)?,
        })
    })
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap()
}

fn meta_rows(conn: &Connection) -> Vec<MetaRow> {
    let mut stmt = conn
        .prepare("SELECT pol, sta, date, code FROM data_meta ORDER BY pol, sta, date")
        .unwrap();
    stmt.query_map([], |row| {
        Ok(MetaRow {
            pollutant_id: row.get(0)?,
            station_id: row.get(1)?,
            timestamp: row.get(2)?,
            code: row.get(3)?,
        })
    })
    .unwrap()
    .collect::<rusqlite::Result<_>>()
    .unwrap()
}

#[test]
fn test_end_to_end_conversion() {
    let input = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    write_input(
        input.path(),
        "[100, 200, 300]",
        &[(SeriesId::new(6, 1002), r#"[1.5, "missing", 2.5]"#)],
    );

    let report = Converter::new(config_for(input.path(), &db_path, true))
        .with_silent(true)
        .run()
        .expect("Conversion failed");

    assert_eq!(report.files, 1);
    assert_eq!(report.fact_rows, Some(2));
    assert_eq!(report.meta_rows, Some(1));
    assert!(report.indices_built);

    let conn = Connection::open(&db_path).unwrap();
    let id = SeriesId::new(6, 1002);
    assert_eq!(
        fact_rows(&conn),
        vec![FactRow::new(id, 100, 1.5), FactRow::new(id, 300, 2.5)]
    );
    assert_eq!(meta_rows(&conn), vec![MetaRow::new(id, 200, 2)]);
}

#[test]
fn test_multiple_series_and_unknown_annotations() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    write_input(
        input.path(),
        "[1, 2]",
        &[
            (SeriesId::new(8, 2), r#"[4.0, "unknown_tag"]"#),
            (SeriesId::new(1, 7), r#"[0.5, 1.5]"#),
            (SeriesId::new(3, 7), r#"["missing", "ok"]"#),
        ],
    );

    let report = Converter::new(config_for(input.path(), &db_path, true))
        .with_silent(true)
        .run()
        .unwrap();

    assert_eq!(report.files, 3);
    assert_eq!(report.fact_rows, Some(3));
    assert_eq!(report.meta_rows, Some(3));

    let conn = Connection::open(&db_path).unwrap();
    let codes: Vec<(i64, i64, i64)> = meta_rows(&conn)
        .into_iter()
        .map(|row| (row.pollutant_id, row.timestamp, row.code))
        .collect();
    assert_eq!(codes, vec![(3, 1, 2), (3, 2, 1), (8, 2, 0)]);
}

#[test]
fn test_failed_run_leaves_no_rows() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    write_input(
        input.path(),
        "[1, 2, 3]",
        &[
            (SeriesId::new(1, 1), "[1.0, 2.0, 3.0]"),
            (SeriesId::new(2, 2), "[1.0, 2.0]"),
        ],
    );

    let mut config = config_for(input.path(), &db_path, false);
    config.batch_size = 1;

    let result = Converter::new(config).with_silent(true).run();
    assert!(matches!(result, Err(ProcessingError::LengthMismatch { .. })));

    let conn = Connection::open(&db_path).unwrap();
    assert!(fact_rows(&conn).is_empty());
}

#[test]
fn test_bad_file_name_aborts_before_loading() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    write_input(input.path(), "[1]", &[(SeriesId::new(1, 1), "[1.0]")]);
    fs::write(input.path().join("stations.json"), "[2.0]").unwrap();

    let result = Converter::new(config_for(input.path(), &db_path, false))
        .with_silent(true)
        .run();
    assert!(matches!(result, Err(ProcessingError::InvalidFileName { .. })));
}

#[test]
fn test_missing_destination_table() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("empty.db");

    Connection::open(&db_path).unwrap();
    write_input(input.path(), "[1]", &[(SeriesId::new(1, 1), "[1.0]")]);

    let result = Converter::new(config_for(input.path(), &db_path, false))
        .with_silent(true)
        .run();
    assert!(matches!(result, Err(ProcessingError::MissingTable(_))));
}

#[test]
fn test_missing_database_file_is_not_created() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("absent.db");

    write_input(input.path(), "[1]", &[(SeriesId::new(1, 1), "[1.0]")]);

    let result = Converter::new(config_for(input.path(), &db_path, false))
        .with_silent(true)
        .run();
    assert!(matches!(result, Err(ProcessingError::MissingData(_))));
    assert!(!db_path.exists());
}

#[cfg(unix)]
#[test]
fn test_symlinked_series_is_loaded() {
    let source = TempDir::new().unwrap();
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    fs::write(source.path().join("6_1002.json"), "[1.5, 2.5]").unwrap();
    fs::write(input.path().join("index.json"), "[1, 2]").unwrap();
    fs::write(input.path().join("._6_1002.json"), "resource fork").unwrap();
    std::os::unix::fs::symlink(
        source.path().join("6_1002.json"),
        input.path().join("6_1002.json"),
    )
    .unwrap();

    let report = Converter::new(config_for(input.path(), &db_path, false))
        .with_silent(true)
        .run()
        .unwrap();

    assert_eq!(report.files, 1);
    assert_eq!(report.fact_rows, Some(2));

    let conn = Connection::open(&db_path).unwrap();
    let id = SeriesId::new(6, 1002);
    assert_eq!(
        fact_rows(&conn),
        vec![FactRow::new(id, 1, 1.5), FactRow::new(id, 2, 2.5)]
    );
}

#[test]
fn test_index_queries_after_load() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    write_input(
        input.path(),
        "[10, 20, 30]",
        &[
            (SeriesId::new(1, 100), r#"[1.0, "missing", "missing"]"#),
            (SeriesId::new(1, 200), r#"["missing", 2.0, "missing"]"#),
            (SeriesId::new(2, 100), r#"["missing", "missing", 3.0]"#),
        ],
    );

    let loader = JsonSeriesLoader::new();
    let generator = RowGenerator::new(input.path(), loader);
    let mut conn = open_database(&db_path).unwrap();

    let inserted = BulkLoader::new()
        .load(&mut conn, generator.fact_rows(None).unwrap())
        .unwrap();
    assert_eq!(inserted, 3);

    IndexBuilder::build_all(&conn).unwrap();

    let by_key: f64 = conn
        .query_row(
            "SELECT value FROM data WHERE pol = 1 AND sta = 200 AND date = 20",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(by_key, 2.0);

    let by_date: i64 = conn
        .query_row("SELECT COUNT(*) FROM data WHERE date = 30", [], |row| row.get(0))
        .unwrap();
    assert_eq!(by_date, 1);

    let by_station: i64 = conn
        .query_row("SELECT COUNT(*) FROM data WHERE sta = 100", [], |row| row.get(0))
        .unwrap();
    assert_eq!(by_station, 2);

    let lookup = MetaLookup::load(&conn).unwrap();
    let annotated = BulkLoader::new()
        .load(&mut conn, generator.meta_rows(&lookup, None).unwrap())
        .unwrap();
    assert_eq!(annotated, 6);
}

#[tokio::test]
async fn test_conversion_on_blocking_pool() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let db_path = output.path().join("airpy.db");

    create_database(&db_path);
    write_input(input.path(), "[1, 2]", &[(SeriesId::new(5, 5), "[1.0, null]")]);

    let report = Converter::new(config_for(input.path(), &db_path, false))
        .with_silent(true)
        .run_blocking()
        .await
        .unwrap();

    assert_eq!(report.fact_rows, Some(1));
    assert_eq!(report.meta_rows, None);
    assert_eq!(report.coerced_cells, 1);
    assert!(report.elapsed_message().starts_with("Database created in"));
}

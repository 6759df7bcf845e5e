//! SQLite sink.
//!
//! A replace drops and recreates the table, then inserts rows with multi-row
//! `INSERT` statements of `batch_size` rows each. Everything happens in one
//! transaction, so readers see either the old table or the complete new one.
//!
//! A batch binds one parameter per column per row, so batches are clamped to
//! what fits in SQLite's host-parameter limit.

use std::path::Path;

use rusqlite::{Connection, params_from_iter, types::Value as SqlValue};

use crate::config::{DatabaseConfig, validate_table_name};
use crate::domain::{Observation, ObservationSet};
use crate::error::AppError;
use crate::sink::TableSink;

const COLUMNS: &str = "country, country_code, country_group, indicator_code, indicator_name, year, value, is_outlier";
const COLUMN_COUNT: usize = 8;
/// `SQLITE_MAX_VARIABLE_NUMBER` of the bundled SQLite (>= 3.32).
const MAX_VARIABLES: usize = 32_766;
const MAX_ROWS_PER_INSERT: usize = MAX_VARIABLES / COLUMN_COUNT;

pub struct SqliteSink {
    conn: Connection,
    batch_size: usize,
}

impl SqliteSink {
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::load(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::load(format!("Failed to open database '{}': {e}", path.display())))?;
        Self::with_connection(conn, batch_size)
    }

    /// Open the store described by environment credentials.
    pub fn connect(db: &DatabaseConfig, batch_size: usize) -> Result<Self, AppError> {
        log::info!("Connecting to {}", db.connection_string());
        Self::open(db.database_path(), batch_size)
    }

    pub fn with_connection(conn: Connection, batch_size: usize) -> Result<Self, AppError> {
        if batch_size == 0 {
            return Err(AppError::config("Batch size must be at least 1."));
        }
        if batch_size > MAX_ROWS_PER_INSERT {
            log::debug!("Batch size {batch_size} exceeds SQLite parameter limit; using {MAX_ROWS_PER_INSERT}");
        }
        Ok(Self {
            conn,
            batch_size: batch_size.min(MAX_ROWS_PER_INSERT),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableSink for SqliteSink {
    fn replace_table(&mut self, table: &str, rows: &ObservationSet) -> Result<usize, AppError> {
        validate_table_name(table)?;

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{table}\";
             CREATE TABLE \"{table}\" (
                country TEXT NOT NULL,
                country_code TEXT NOT NULL,
                country_group TEXT NOT NULL,
                indicator_code TEXT NOT NULL,
                indicator_name TEXT NOT NULL,
                year INTEGER NOT NULL,
                value REAL NOT NULL,
                is_outlier INTEGER NOT NULL
             );"
        ))?;

        let mut written = 0usize;
        for chunk in rows.as_slice().chunks(self.batch_size) {
            let sql = insert_sql(table, chunk.len());
            let mut stmt = tx.prepare_cached(&sql)?;
            written += stmt.execute(params_from_iter(chunk.iter().flat_map(row_values)))?;
        }

        tx.commit()?;
        log::debug!("Replaced {table} with {written} rows");
        Ok(written)
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

fn insert_sql(table: &str, rows: usize) -> String {
    let placeholders = format!("({})", vec!["?"; COLUMN_COUNT].join(", "));
    let values = vec![placeholders.as_str(); rows].join(", ");
    format!("INSERT INTO \"{table}\" ({COLUMNS}) VALUES {values}")
}

fn row_values(o: &Observation) -> [SqlValue; COLUMN_COUNT] {
    [
        SqlValue::Text(o.country.clone()),
        SqlValue::Text(o.country_code.clone()),
        SqlValue::Text(o.country_group.clone()),
        SqlValue::Text(o.indicator_code.clone()),
        SqlValue::Text(o.indicator_name.clone()),
        SqlValue::Integer(i64::from(o.year)),
        SqlValue::Real(o.value),
        SqlValue::Integer(i64::from(o.is_outlier)),
    ]
}

//! SQLite sink with replace-write semantics.
//!
//! Each write opens the database file and, inside one transaction, drops the
//! named table if it exists, recreates it from the frame's column types and
//! inserts every row. A failed write leaves the previous table untouched.
//! No upsert, no append, no migration.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use super::cells::{frame_cells, sql_affinity};
use super::PersistError;
use crate::table::Tabular;

/// A single database file holding one or more replace-written tables.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop `table` if present, then write `data` in full. Returns rows written.
    pub fn replace_table<T: Tabular + ?Sized>(
        &self,
        table: &str,
        data: &T,
    ) -> Result<usize, PersistError> {
        let frame = data.frame();
        let columns = frame_cells(frame)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PersistError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut conn = Connection::open(&self.path)?;
        let ident = quote_ident(table);
        let tx = conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {ident}"), [])?;

        let definitions = frame
            .get_columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(c.name()), sql_affinity(c.dtype())))
            .collect::<Vec<_>>()
            .join(", ");
        tx.execute(&format!("CREATE TABLE {ident} ({definitions})"), [])?;

        let placeholders = vec!["?"; frame.width()].join(", ");
        let insert = format!("INSERT INTO {ident} VALUES ({placeholders})");
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in 0..frame.height() {
                stmt.execute(params_from_iter(columns.iter().map(|c| c[row].sql_value())))?;
            }
        }
        tx.commit()?;
        conn.close().map_err(|(_, e)| e)?;

        debug!(
            database = %self.path.display(),
            table,
            rows = frame.height(),
            "replaced table"
        );
        Ok(frame.height())
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize, PersistError> {
        let conn = Connection::open(&self.path)?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Column names of `table`, in declaration order.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>, PersistError> {
        let conn = Connection::open(&self.path)?;
        let stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT 0", quote_ident(table)))?;
        Ok(stmt.column_names().into_iter().map(str::to_string).collect())
    }

    /// Sorted distinct non-null values of a text column.
    pub fn distinct_text(&self, table: &str, column: &str) -> Result<Vec<String>, PersistError> {
        let conn = Connection::open(&self.path)?;
        let col = quote_ident(column);
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT {col} FROM {} WHERE {col} IS NOT NULL ORDER BY {col}",
            quote_ident(table)
        ))?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn frame(rows: usize) -> DataFrame {
        let days: Vec<i32> = (0..rows as i32).map(|i| 19724 + i).collect();
        let temps: Vec<f64> = (0..rows).map(|i| i as f64 * 1.5).collect();
        DataFrame::new(vec![
            Column::new("Fecha".into(), days).cast(&DataType::Date).unwrap(),
            Column::new("Temp_Promedio".into(), temps),
        ])
        .unwrap()
    }

    #[test]
    fn replace_write_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = SqliteSink::new(tmp.path().join("meteorologia.db"));

        assert_eq!(sink.replace_table("meteorologia", &frame(5)).unwrap(), 5);
        assert_eq!(sink.replace_table("meteorologia", &frame(5)).unwrap(), 5);
        assert_eq!(sink.row_count("meteorologia").unwrap(), 5);

        sink.replace_table("meteorologia", &frame(2)).unwrap();
        assert_eq!(sink.row_count("meteorologia").unwrap(), 2);
    }

    #[test]
    fn schema_follows_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = SqliteSink::new(tmp.path().join("db/nested.db"));
        sink.replace_table("t", &frame(1)).unwrap();

        assert_eq!(
            sink.column_names("t").unwrap(),
            vec!["Fecha".to_string(), "Temp_Promedio".to_string()]
        );

        let conn = Connection::open(sink.path()).unwrap();
        let stored: String = conn
            .query_row("SELECT Fecha FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "2024-01-02 00:00:00");
    }

    #[test]
    fn failed_replace_keeps_previous_table() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = SqliteSink::new(tmp.path().join("meteorologia.db"));
        sink.replace_table("meteorologia", &frame(3)).unwrap();

        // A frame without columns cannot be created as a table.
        assert!(sink.replace_table("meteorologia", &DataFrame::empty()).is_err());
        assert_eq!(sink.row_count("meteorologia").unwrap(), 3);
        assert_eq!(
            sink.column_names("meteorologia").unwrap(),
            vec!["Fecha".to_string(), "Temp_Promedio".to_string()]
        );
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("precios"), "\"precios\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}

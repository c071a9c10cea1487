//! Row source boundary: one query per lookup table.
//!
//! Query failures are values here, not panics or early returns, so the
//! orchestrator can degrade a single table and keep going.
use crate::manifest::{HierarchicalTableDescriptor, TableDescriptor};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// One result row with every column coerced to trimmed text.
pub type RawRow = Vec<String>;

#[derive(Debug, Error)]
pub enum RowFetchError {
    #[error("open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("attach {schema} from {path}: {source}")]
    Attach {
        schema: String,
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("{0}")]
    Query(#[from] rusqlite::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Executes a query and returns rows in the source's natural order.
pub trait RowSource {
    fn fetch(&self, sql: &str) -> Result<Vec<RawRow>, RowFetchError>;
}

/// A table query plus the label used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub label: String,
    pub sql: String,
}

impl RowQuery {
    pub fn flat(descriptor: &TableDescriptor) -> Self {
        Self {
            label: descriptor.label(),
            sql: format!(
                "SELECT {}ID, {} FROM {}",
                descriptor.table,
                descriptor.description_column,
                descriptor.label()
            ),
        }
    }

    pub fn hierarchical(descriptor: &HierarchicalTableDescriptor) -> Self {
        Self {
            label: descriptor.label(),
            sql: format!(
                "SELECT {}ID, {}, {} FROM {}",
                descriptor.table,
                descriptor.description_column,
                descriptor.parent_column,
                descriptor.label()
            ),
        }
    }
}

/// Run `query` against `source`, logging timing and failures.
pub fn fetch_rows<S: RowSource + ?Sized>(
    source: &S,
    query: &RowQuery,
) -> Result<Vec<RawRow>, RowFetchError> {
    tracing::debug!(table = %query.label, sql = %query.sql, "issuing lookup query");
    let start = Instant::now();
    let result = source.fetch(&query.sql);
    let elapsed_ms = start.elapsed().as_millis();
    match &result {
        Ok(rows) => tracing::info!(
            table = %query.label,
            rows = rows.len(),
            elapsed_ms,
            "lookup query complete"
        ),
        Err(err) => tracing::debug!(table = %query.label, elapsed_ms, "lookup query failed: {err}"),
    }
    result
}

/// SQLite-backed row source.
///
/// Each schema named in a manifest resolves through an attached database, so
/// `SELECT ... FROM sales.OrderType` works against `attach["sales"]`.
#[derive(Debug, Clone)]
pub struct SqliteRowSource {
    database: PathBuf,
    attach: BTreeMap<String, PathBuf>,
    timeout: Duration,
}

impl SqliteRowSource {
    pub fn new(database: PathBuf, attach: BTreeMap<String, PathBuf>, timeout: Duration) -> Self {
        Self {
            database,
            attach,
            timeout,
        }
    }

    fn open(&self) -> Result<Connection, RowFetchError> {
        let conn = Connection::open(&self.database).map_err(|source| RowFetchError::Open {
            path: self.database.clone(),
            source,
        })?;
        conn.busy_timeout(self.timeout)?;
        for (schema, path) in &self.attach {
            let path_text = path.to_string_lossy();
            conn.execute(
                &format!("ATTACH DATABASE ?1 AS \"{}\"", schema.replace('"', "\"\"")),
                [path_text.as_ref()],
            )
            .map_err(|source| RowFetchError::Attach {
                schema: schema.clone(),
                path: path.clone(),
                source,
            })?;
        }
        Ok(conn)
    }
}

impl RowSource for SqliteRowSource {
    fn fetch(&self, sql: &str) -> Result<Vec<RawRow>, RowFetchError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(value_text(row.get_ref(idx)?));
            }
            out.push(values);
        }
        Ok(out)
    }
}

fn value_text(value: ValueRef<'_>) -> String {
    let text = match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(value) => value.to_string(),
        ValueRef::Real(value) => value.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).to_string(),
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn create_db(path: &Path, statements: &str) {
        let conn = Connection::open(path).expect("open db");
        conn.execute_batch(statements).expect("seed db");
    }

    fn status_descriptor() -> TableDescriptor {
        TableDescriptor {
            schema: "dbo".to_string(),
            table: "Status".to_string(),
            description_column: "StatusName".to_string(),
        }
    }

    #[test]
    fn flat_query_selects_id_and_description() {
        let query = RowQuery::flat(&status_descriptor());
        assert_eq!(query.sql, "SELECT StatusID, StatusName FROM dbo.Status");
        assert_eq!(query.label, "dbo.Status");
    }

    #[test]
    fn hierarchical_query_reads_from_view() {
        let query = RowQuery::hierarchical(&HierarchicalTableDescriptor {
            schema: "hr".to_string(),
            table: "Role".to_string(),
            view: "RoleView".to_string(),
            description_column: "RoleName".to_string(),
            parent_column: "Department".to_string(),
        });
        assert_eq!(
            query.sql,
            "SELECT RoleID, RoleName, Department FROM hr.RoleView"
        );
        assert_eq!(query.label, "hr.RoleView");
    }

    #[test]
    fn sqlite_source_reads_attached_schema_in_natural_order() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let main_db = temp_dir.path().join("main.db");
        let dbo_db = temp_dir.path().join("dbo.db");
        create_db(&main_db, "");
        create_db(
            &dbo_db,
            "CREATE TABLE Status (StatusID INTEGER, StatusName TEXT);
             INSERT INTO Status VALUES (2, '  In Progress '), (1, 'Active'), (3, NULL);",
        );
        let source = SqliteRowSource::new(
            main_db,
            BTreeMap::from([("dbo".to_string(), dbo_db)]),
            Duration::from_millis(500),
        );

        let rows = fetch_rows(&source, &RowQuery::flat(&status_descriptor())).expect("fetch rows");
        assert_eq!(
            rows,
            vec![
                vec!["2".to_string(), "In Progress".to_string()],
                vec!["1".to_string(), "Active".to_string()],
                vec!["3".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn missing_table_is_a_query_error() {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let main_db = temp_dir.path().join("main.db");
        create_db(&main_db, "");
        let source = SqliteRowSource::new(main_db, BTreeMap::new(), Duration::from_millis(500));

        let err = source
            .fetch("SELECT StatusID, StatusName FROM main.Status")
            .expect_err("missing table");
        assert!(matches!(err, RowFetchError::Query(_)));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn real_values_keep_their_text() {
        assert_eq!(value_text(ValueRef::Real(1.5)), "1.5");
        assert_eq!(value_text(ValueRef::Integer(42)), "42");
        assert_eq!(value_text(ValueRef::Text(b" x ")), "x");
    }
}

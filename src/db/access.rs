//! SQLite as a live-query access point.
//!
//! The query text may hold several statements; they run in order. Bound
//! parameters apply to the first statement only. A statement contributes a
//! [`ResultSet`] only when it produced at least one row, so a query that
//! matches nothing yields an empty vec.

use anyhow::{anyhow, Context, Result};
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Batch, Connection};
use std::sync::Mutex;

use crate::query::{AccessPoint, ResultSet, Scalar};

impl ToSql for Scalar {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Scalar::Null => ValueRef::Null,
            Scalar::Integer(i) => ValueRef::Integer(*i),
            Scalar::Real(r) => ValueRef::Real(*r),
            Scalar::Text(s) => ValueRef::Text(s.as_bytes()),
            Scalar::Blob(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

impl From<ValueRef<'_>> for Scalar {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Scalar::Null,
            ValueRef::Integer(i) => Scalar::Integer(i),
            ValueRef::Real(r) => Scalar::Real(r),
            ValueRef::Text(t) => Scalar::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Scalar::Blob(b.to_vec()),
        }
    }
}

impl AccessPoint for Connection {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        let mut batch = Batch::new(self, query);
        let mut result_sets = Vec::new();
        let mut first = true;

        while let Some(mut stmt) = batch.next()? {
            let bound: &[Scalar] = if first { params } else { &[] };
            first = false;

            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = columns.len();

            let mut rows = stmt.query(params_from_iter(bound.iter()))?;
            let mut values = Vec::new();
            while let Some(row) = rows.next()? {
                let mut cells = Vec::with_capacity(width);
                for i in 0..width {
                    cells.push(Scalar::from(row.get_ref(i)?));
                }
                values.push(cells);
            }

            if width > 0 && !values.is_empty() {
                result_sets.push(ResultSet { columns, values });
            }
        }

        tracing::trace!(sets = result_sets.len(), "sqlite query executed");
        Ok(result_sets)
    }
}

impl AccessPoint for Mutex<Connection> {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        let conn = self
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        AccessPoint::execute(&*conn, query, params).context("query on shared connection")
    }
}

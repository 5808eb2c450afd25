//! Columnar result sets and their materialization into keyed rows.

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

use super::error::QueryError;
use super::value::Scalar;

/// Output of one statement: column names plus positionally aligned rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Scalar>>,
}

impl ResultSet {
    pub fn new<C: Into<String>>(
        columns: impl IntoIterator<Item = C>,
        values: Vec<Vec<Scalar>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            values,
        }
    }
}

/// One materialized row: a column-name to value mapping in column order.
///
/// Rows from the same execution share a single column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Scalar>,
}

impl Row {
    /// Value of `column`, or `None` if the row has no such column.
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Decode into a caller-declared shape. Materialization never checks the
    /// shape; this is where a mismatch surfaces.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.to_json())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Zip the first result set's rows against its columns.
///
/// No result sets means the query ran and produced nothing: an empty vec.
/// Result sets after the first are ignored. A row whose length differs from
/// the column count fails the whole materialization with
/// [`QueryError::RowShape`].
///
/// Repeated column names (`SELECT a.id, b.id ...`) collapse into one key: it
/// keeps the position of its first occurrence and the value of its last, so
/// [`Row::get`], [`Row::to_json`] and serialization all agree.
pub fn materialize(result_sets: Vec<ResultSet>) -> Result<Vec<Row>, QueryError> {
    let Some(first) = result_sets.into_iter().next() else {
        return Ok(Vec::new());
    };

    let width = first.columns.len();
    let picks = distinct_columns(&first.columns);
    let columns: Arc<[String]> = match &picks {
        Some(picks) => picks.iter().map(|&i| first.columns[i].clone()).collect(),
        None => first.columns.into(),
    };

    first
        .values
        .into_iter()
        .enumerate()
        .map(|(row, values)| {
            if values.len() != width {
                return Err(QueryError::RowShape {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            let values = match &picks {
                Some(picks) => picks.iter().map(|&i| values[i].clone()).collect(),
                None => values,
            };
            Ok(Row {
                columns: Arc::clone(&columns),
                values,
            })
        })
        .collect()
}

/// For each distinct column name in first-seen order, the index of its last
/// occurrence. `None` when every name is already unique.
fn distinct_columns(columns: &[String]) -> Option<Vec<usize>> {
    let mut picks: Vec<usize> = Vec::with_capacity(columns.len());
    for (i, name) in columns.iter().enumerate() {
        match picks.iter_mut().find(|p| columns[**p] == *name) {
            Some(p) => *p = i,
            None => picks.push(i),
        }
    }
    (picks.len() != columns.len()).then_some(picks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> ResultSet {
        ResultSet::new(
            ["id", "name", "count"],
            vec![
                vec!["1".into(), "Alice".into(), 10.into()],
                vec!["2".into(), "Bob".into(), 20.into()],
            ],
        )
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(materialize(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn zips_columns_in_order() {
        let rows = materialize(vec![people()]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&Scalar::from("1")));
        assert_eq!(rows[0].get("name"), Some(&Scalar::from("Alice")));
        assert_eq!(rows[1].get("count"), Some(&Scalar::Integer(20)));

        let keys: Vec<&str> = rows[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id", "name", "count"]);
    }

    #[test]
    fn only_first_result_set_is_used() {
        let second = ResultSet::new(["other"], vec![vec![Scalar::Null]]);
        let rows = materialize(vec![people(), second]).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].get("other").is_none());
    }

    #[test]
    fn short_row_fails_closed() {
        let mut set = people();
        set.values[1].pop();
        let err = materialize(vec![set]).unwrap_err();
        assert_eq!(
            err,
            QueryError::RowShape {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn repeated_columns_keep_the_last_value() {
        let set = ResultSet::new(
            ["id", "name", "id"],
            vec![vec![1.into(), "Alice".into(), 2.into()]],
        );
        let rows = materialize(vec![set]).unwrap();
        let row = &rows[0];

        assert_eq!(row.columns(), ["id", "name"]);
        assert_eq!(row.get("id"), Some(&Scalar::Integer(2)));
        assert_eq!(row.to_json(), serde_json::json!({"id": 2, "name": "Alice"}));
        assert_eq!(
            serde_json::to_string(row).unwrap(),
            r#"{"id":2,"name":"Alice"}"#
        );
    }

    #[test]
    fn repeated_columns_still_check_row_width() {
        let set = ResultSet::new(["id", "id"], vec![vec![1.into()]]);
        assert_eq!(
            materialize(vec![set]).unwrap_err(),
            QueryError::RowShape {
                row: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn columns_without_rows() {
        let set = ResultSet::new(["id"], Vec::new());
        assert!(materialize(vec![set]).unwrap().is_empty());
    }

    #[test]
    fn serializes_in_column_order() {
        let rows = materialize(vec![people()]).unwrap();
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert_eq!(json, r#"{"id":"1","name":"Alice","count":10}"#);
    }

    #[test]
    fn decode_into_caller_shape() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Person {
            id: String,
            name: String,
            count: i64,
        }

        let rows = materialize(vec![people()]).unwrap();
        let bob: Person = rows[1].decode().unwrap();
        assert_eq!(
            bob,
            Person {
                id: "2".into(),
                name: "Bob".into(),
                count: 20
            }
        );
    }
}

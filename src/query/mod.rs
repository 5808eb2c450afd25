//! Query execution seam: scalar values, result sets, materialized rows, and
//! the [`AccessPoint`] trait that live queries run against.

pub mod error;
pub mod result;
pub mod value;

pub use error::QueryError;
pub use result::{materialize, ResultSet, Row};
pub use value::Scalar;

use anyhow::Result;
use std::rc::Rc;
use std::sync::Arc;

/// Something that can run SQL and hand back columnar result sets.
///
/// Calls are synchronous and run to completion. An empty vec means the query
/// produced no rows; it is not a failure. Implementations may report faults
/// of any shape; bindings normalize them into [`QueryError`].
pub trait AccessPoint {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>>;
}

impl<A: AccessPoint + ?Sized> AccessPoint for &A {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        (**self).execute(query, params)
    }
}

impl<A: AccessPoint + ?Sized> AccessPoint for Box<A> {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        (**self).execute(query, params)
    }
}

impl<A: AccessPoint + ?Sized> AccessPoint for Rc<A> {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        (**self).execute(query, params)
    }
}

impl<A: AccessPoint + ?Sized> AccessPoint for Arc<A> {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        (**self).execute(query, params)
    }
}

/// Run `query` once and materialize the result, without any binding state.
pub fn fetch_rows<A: AccessPoint + ?Sized>(
    access: &A,
    query: &str,
    params: &[Scalar],
) -> std::result::Result<Vec<Row>, QueryError> {
    let sets = access.execute(query, params)?;
    materialize(sets)
}

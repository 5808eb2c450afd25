//! The failure value a live query publishes in place of rows.

use thiserror::Error;

/// A captured query failure.
///
/// Bindings never raise these; they store them in [`LiveQueryState::error`]
/// for consumers to render.
///
/// [`LiveQueryState::error`]: crate::live::LiveQueryState::error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The access point rejected the query (bad SQL, constraint, type mismatch, ...).
    #[error("{message}")]
    Fault { message: String },

    /// A result row did not line up with its column list.
    #[error("row {row} has {found} values but the result set has {expected} columns")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl QueryError {
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }

    /// Human-readable message, as displayed.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<QueryError>() {
            Ok(query_err) => query_err,
            Err(other) => Self::fault(format!("{other:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_messages_become_faults() {
        let err = QueryError::from(anyhow::anyhow!("Query failed"));
        assert_eq!(err, QueryError::fault("Query failed"));
        assert_eq!(err.message(), "Query failed");
    }

    #[test]
    fn context_chain_is_kept_in_message() {
        let err = anyhow::anyhow!("no such table: widgets").context("prepare failed");
        assert_eq!(
            QueryError::from(err).message(),
            "prepare failed: no such table: widgets"
        );
    }

    #[test]
    fn existing_query_errors_pass_through() {
        let shape = QueryError::RowShape {
            row: 1,
            expected: 3,
            found: 2,
        };
        let err = anyhow::Error::new(shape.clone());
        assert_eq!(QueryError::from(err), shape);
    }
}

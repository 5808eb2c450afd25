use crate::query::Scalar;

/// The identity of a live query: SQL text, bound parameters, and dependency keys.
///
/// Two keys are equal when the query text matches and `params` and `deps` are
/// positionally equal. A `None` query means "run nothing".
///
/// Dependencies are never sent to the database. They exist only to force a
/// re-run when something outside the query changes, e.g. a mutation counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryKey {
    query: Option<String>,
    params: Vec<Scalar>,
    deps: Vec<Scalar>,
}

impl QueryKey {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// A key with no query.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn maybe(query: Option<impl Into<String>>) -> Self {
        Self {
            query: query.map(Into::into),
            ..Self::default()
        }
    }

    /// Append one bound parameter.
    pub fn param(mut self, value: impl Into<Scalar>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn with_params<I, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Append one dependency key.
    pub fn dep(mut self, value: impl Into<Scalar>) -> Self {
        self.deps.push(value.into());
        self
    }

    pub fn with_deps<I, V>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn params(&self) -> &[Scalar] {
        &self.params
    }

    pub fn deps(&self) -> &[Scalar] {
        &self.deps
    }
}

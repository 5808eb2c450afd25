//! Live query bindings.
//!
//! A [`LiveQuery`] holds one query identity ([`QueryKey`]) against one
//! [`AccessPoint`] and keeps the latest rows or the latest failure. It runs
//! the query when it is bound, whenever it is rebound with a key that differs
//! from the one in force, and whenever [`LiveQuery::refetch`] is called.
//!
//! Everything is synchronous: by the time `bind`, `rebind` or `refetch`
//! returns, [`LiveQuery::state`] reflects that execution. Failures are never
//! raised to the caller; they are published through [`LiveQuery::error`].
//!
//! ```no_run
//! use memlive::live::{LiveQuery, QueryKey};
//!
//! let conn = memlive::db::open_memory_database()?;
//! let mut revision = 0;
//! let key = |rev: i64| {
//!     QueryKey::new("SELECT id, content FROM memories WHERE archived = ?1")
//!         .param(false)
//!         .dep(rev)
//! };
//!
//! let mut live = LiveQuery::bind(&conn, key(revision));
//! // ... mutate the table ...
//! revision += 1;
//! live.rebind(key(revision)); // re-runs because the dependency changed
//! # Ok::<(), anyhow::Error>(())
//! ```

mod key;

pub use key::QueryKey;

use tracing::{debug, trace, warn};

use crate::query::{materialize, AccessPoint, QueryError, Row};

/// Published state of a binding. Replaced wholesale by every execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveQueryState {
    pub data: Vec<Row>,
    pub error: Option<QueryError>,
}

/// Which state a binding is in after its last execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No query is bound.
    Idle,
    /// The last execution succeeded (possibly with zero rows).
    Ready,
    /// The last execution failed; see [`LiveQuery::error`].
    Failed,
}

/// Handle returned by [`LiveQuery::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&LiveQueryState)>;

/// A reactive binding of one query to an access point.
pub struct LiveQuery<A> {
    access: A,
    key: QueryKey,
    state: LiveQueryState,
    executions: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<A: AccessPoint> LiveQuery<A> {
    /// Establish a binding and run it once.
    pub fn bind(access: A, key: QueryKey) -> Self {
        let mut live = Self {
            access,
            key,
            state: LiveQueryState::default(),
            executions: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        };
        live.execute();
        live
    }

    /// Point the binding at `key`. Runs the query only if `key` differs from
    /// the key in force; returns whether it ran.
    pub fn rebind(&mut self, key: QueryKey) -> bool {
        if key == self.key {
            trace!("live query key unchanged, skipping");
            return false;
        }
        self.key = key;
        self.execute();
        true
    }

    /// Run the current query again, whether or not anything changed.
    pub fn refetch(&mut self) {
        self.execute();
    }

    pub fn data(&self) -> &[Row] {
        &self.state.data
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.state.error.as_ref()
    }

    pub fn state(&self) -> &LiveQueryState {
        &self.state
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn status(&self) -> QueryStatus {
        if self.key.query().is_none() {
            QueryStatus::Idle
        } else if self.state.error.is_some() {
            QueryStatus::Failed
        } else {
            QueryStatus::Ready
        }
    }

    /// Number of calls this binding has made to its access point.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    /// Register a listener invoked after every publish, in registration order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&LiveQueryState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() < before
    }

    /// Release the binding, keeping its last published state.
    pub fn into_state(self) -> LiveQueryState {
        self.state
    }

    fn execute(&mut self) {
        let Some(query) = self.key.query() else {
            // An absent query clears rows but leaves any earlier error in place.
            self.state.data = Vec::new();
            trace!("no query bound");
            self.notify();
            return;
        };

        self.executions += 1;
        let outcome = self
            .access
            .execute(query, self.key.params())
            .map_err(QueryError::from)
            .and_then(materialize);

        self.state = match outcome {
            Ok(data) => {
                debug!(
                    rows = data.len(),
                    params = self.key.params().len(),
                    "live query published"
                );
                LiveQueryState { data, error: None }
            }
            Err(error) => {
                warn!(%error, "live query failed");
                LiveQueryState {
                    data: Vec::new(),
                    error: Some(error),
                }
            }
        };
        self.notify();
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }
}

impl<A> std::fmt::Debug for LiveQuery<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("executions", &self.executions)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

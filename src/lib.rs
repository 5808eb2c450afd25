//! Memory and feedback store with reactive live SQL queries.
//!
//! memlive keeps user memories (facts, preferences, context, instructions) and
//! per-message feedback in an embedded SQLite database. Consumers read that
//! data through [`live::LiveQuery`] bindings: a binding owns one query, its
//! bound parameters and an explicit dependency list, re-runs the query when
//! any of them change, and publishes either the materialized rows or the
//! captured failure.
//!
//! | Piece | What it does |
//! |-------|--------------|
//! | [`query::AccessPoint`] | Runs SQL and returns columnar result sets |
//! | [`query::materialize`] | Zips the first result set's rows against its columns |
//! | [`live::LiveQuery`] | Re-executes on key change or `refetch`, holds `data`/`error` |
//! | [`memory`] | Memory and feedback CRUD plus prebuilt panel queries |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and the SQLite access point
//! - [`query`]: Scalars, result sets, rows, and the access point trait
//! - [`live`]: Live query bindings
//! - [`memory`]: Memory and feedback store

pub mod config;
pub mod db;
pub mod live;
pub mod memory;
pub mod query;

//! CLI `query` command: bind an ad-hoc SQL query and print what it publishes.

use anyhow::{bail, Result};

use memlive::config::MemliveConfig;
use memlive::live::{LiveQuery, QueryKey};
use memlive::query::Scalar;

/// Run `sql` through a live binding and print rows, "no rows", or the failure.
pub fn query(config: &MemliveConfig, sql: &str, params: &[String], json: bool) -> Result<()> {
    let conn = super::open(config)?;
    let key = QueryKey::new(sql).with_params(params.iter().map(|p| Scalar::parse_param(p)));
    let live = LiveQuery::bind(&conn, key);

    if let Some(err) = live.error() {
        bail!("query failed: {err}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(live.data())?);
        return Ok(());
    }

    if live.data().is_empty() {
        println!("No rows.");
        return Ok(());
    }

    for (i, row) in live.data().iter().enumerate() {
        println!("Row {}", i + 1);
        for (column, value) in row.iter() {
            println!("  {:<20} {}", column, value);
        }
    }
    println!();
    println!("{} row(s)", live.data().len());

    Ok(())
}

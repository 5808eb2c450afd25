pub mod doctor;
pub mod feedback;
pub mod memory;
pub mod query;

use anyhow::Result;
use rusqlite::Connection;

use memlive::config::MemliveConfig;

/// Open the configured database.
fn open(config: &MemliveConfig) -> Result<Connection> {
    memlive::db::open_database(config.resolved_db_path())
}

/// Shorten `text` to `max` characters, appending "..." when cut.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

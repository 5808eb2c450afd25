//! SQL DDL for all memlive tables.
//!
//! Defines `memories`, `message_feedback`, and `schema_meta`. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization. Columns added after the
//! first release live in [`super::migrations`].

use rusqlite::Connection;

/// Schema version 1 DDL.
const SCHEMA_SQL: &str = r#"
-- Memories: user facts, preferences, context and instructions
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    importance REAL NOT NULL DEFAULT 0.5 CHECK(importance >= 0.0 AND importance <= 1.0),
    pinned INTEGER NOT NULL DEFAULT 0 CHECK(pinned IN (0, 1)),
    archived INTEGER NOT NULL DEFAULT 0 CHECK(archived IN (0, 1)),
    source_message_id TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_memories_listing ON memories(deleted_at, archived, pinned, importance);
CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);

-- One feedback entry per chat message
CREATE TABLE IF NOT EXISTS message_feedback (
    id TEXT PRIMARY KEY,
    message_id TEXT NOT NULL UNIQUE,
    rating INTEGER NOT NULL CHECK(rating IN (-1, 0, 1)),
    note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

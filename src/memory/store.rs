//! Write path for memories: create, edit, pin, archive, and soft delete.
//!
//! Reads go through the same [`fetch_rows`] + [`Memory::from_row`] path the
//! live panels use, so a memory written here decodes identically in both.

use anyhow::{bail, ensure, Context, Result};
use rusqlite::{params, Connection};

use super::queries;
use super::types::Memory;
use crate::query::fetch_rows;

/// Fields to change on an existing memory. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct MemoryUpdate {
    pub content: Option<String>,
    pub importance: Option<f64>,
    pub tags: Option<Vec<String>>,
}

/// Insert a new memory and return it as stored.
pub fn create_memory(
    conn: &Connection,
    content: &str,
    importance: f64,
    tags: &[String],
    source_message_id: Option<&str>,
) -> Result<Memory> {
    validate_content(content)?;
    validate_importance(importance)?;

    let id = super::new_id("mem");
    let now = chrono::Utc::now().to_rfc3339();
    let tags_json = serde_json::to_string(tags)?;

    conn.execute(
        "INSERT INTO memories (id, content, importance, pinned, archived, source_message_id, tags, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 0, 0, ?4, ?5, ?6, ?6)",
        params![id, content.trim(), importance, source_message_id, tags_json, now],
    )
    .context("failed to insert memory")?;

    tracing::info!(id = %id, content_len = content.len(), tags = tags.len(), "memory created");

    get_memory(conn, &id)?.context("memory vanished after insert")
}

/// Load one memory by id. Deleted memories are returned with `deleted_at` set.
pub fn get_memory(conn: &Connection, id: &str) -> Result<Option<Memory>> {
    let key = queries::memory_by_id(id);
    let query = key.query().unwrap_or_default();
    let rows = fetch_rows(conn, query, key.params())?;
    rows.first().map(Memory::from_row).transpose()
}

/// Apply `update` to a live memory.
pub fn update_memory(conn: &Connection, id: &str, update: &MemoryUpdate) -> Result<Memory> {
    if let Some(content) = &update.content {
        validate_content(content)?;
    }
    if let Some(importance) = update.importance {
        validate_importance(importance)?;
    }
    let tags_json = update
        .tags
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let changed = conn.execute(
        "UPDATE memories SET \
             content = COALESCE(?2, content), \
             importance = COALESCE(?3, importance), \
             tags = COALESCE(?4, tags), \
             updated_at = ?5 \
         WHERE id = ?1 AND deleted_at IS NULL",
        params![
            id,
            update.content.as_deref().map(str::trim),
            update.importance,
            tags_json,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    if changed == 0 {
        bail!("memory not found: {id}");
    }

    tracing::debug!(id, "memory updated");
    get_memory(conn, id)?.context("memory vanished after update")
}

/// Append `tag` to a live memory's tags unless it is already there.
pub fn add_tag(conn: &Connection, id: &str, tag: &str) -> Result<Memory> {
    let tag = tag.trim();
    ensure!(!tag.is_empty(), "tag must not be empty");

    let changed = conn.execute(
        "UPDATE memories SET tags = json_insert(tags, '$[#]', ?2), updated_at = ?3 \
         WHERE id = ?1 AND deleted_at IS NULL \
           AND NOT EXISTS (SELECT 1 FROM json_each(memories.tags) WHERE value = ?2)",
        params![id, tag, chrono::Utc::now().to_rfc3339()],
    )?;
    let mem = live_memory(conn, id)?;
    tracing::debug!(id, tag, added = changed > 0, "memory tag added");
    Ok(mem)
}

/// Remove every occurrence of `tag` from a live memory's tags.
pub fn remove_tag(conn: &Connection, id: &str, tag: &str) -> Result<Memory> {
    let tag = tag.trim();
    let changed = conn.execute(
        "UPDATE memories SET \
             tags = (SELECT json_group_array(value) FROM json_each(memories.tags) WHERE value != ?2), \
             updated_at = ?3 \
         WHERE id = ?1 AND deleted_at IS NULL \
           AND EXISTS (SELECT 1 FROM json_each(memories.tags) WHERE value = ?2)",
        params![id, tag, chrono::Utc::now().to_rfc3339()],
    )?;
    let mem = live_memory(conn, id)?;
    tracing::debug!(id, tag, removed = changed > 0, "memory tag removed");
    Ok(mem)
}

/// One page of live memories plus the count across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPage {
    pub memories: Vec<Memory>,
    pub total: usize,
}

/// List live memories in panel order, `limit` at a time starting at `offset`.
pub fn list_memories(conn: &Connection, limit: usize, offset: usize) -> Result<MemoryPage> {
    let count = queries::active_memory_count();
    let rows = fetch_rows(conn, count.query().unwrap_or_default(), count.params())?;
    let total = rows
        .first()
        .and_then(|row| row.get("total"))
        .and_then(|v| v.as_i64())
        .context("memory count returned no total")?;

    let page = queries::active_memories(limit, offset);
    let rows = fetch_rows(conn, page.query().unwrap_or_default(), page.params())?;
    let memories = rows.iter().map(Memory::from_row).collect::<Result<Vec<_>>>()?;

    Ok(MemoryPage {
        memories,
        total: usize::try_from(total)?,
    })
}

/// Pin or unpin a live memory.
pub fn set_pinned(conn: &Connection, id: &str, pinned: bool) -> Result<()> {
    set_flag(conn, id, "pinned", pinned)
}

/// Archive or restore a live memory.
pub fn set_archived(conn: &Connection, id: &str, archived: bool) -> Result<()> {
    set_flag(conn, id, "archived", archived)
}

/// Soft delete: stamp `deleted_at` and keep the reason.
pub fn delete_memory(conn: &Connection, id: &str, reason: Option<&str>) -> Result<()> {
    let changed = conn.execute(
        "UPDATE memories SET deleted_at = ?2, deleted_reason = ?3, updated_at = ?2 \
         WHERE id = ?1 AND deleted_at IS NULL",
        params![id, chrono::Utc::now().to_rfc3339(), reason],
    )?;
    if changed == 0 {
        bail!("memory not found: {id}");
    }
    tracing::info!(id, reason = reason.unwrap_or(""), "memory deleted");
    Ok(())
}

fn live_memory(conn: &Connection, id: &str) -> Result<Memory> {
    match get_memory(conn, id)? {
        Some(mem) if !mem.is_deleted() => Ok(mem),
        _ => bail!("memory not found: {id}"),
    }
}

fn set_flag(conn: &Connection, id: &str, column: &str, value: bool) -> Result<()> {
    // `column` is always one of our own literals, never user input.
    let sql = format!(
        "UPDATE memories SET {column} = ?2, updated_at = ?3 WHERE id = ?1 AND deleted_at IS NULL"
    );
    let changed = conn.execute(&sql, params![id, value, chrono::Utc::now().to_rfc3339()])?;
    if changed == 0 {
        bail!("memory not found: {id}");
    }
    tracing::debug!(id, column, value, "memory flag set");
    Ok(())
}

fn validate_content(content: &str) -> Result<()> {
    ensure!(!content.trim().is_empty(), "content must not be empty");
    Ok(())
}

fn validate_importance(importance: f64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&importance),
        "importance must be between 0.0 and 1.0"
    );
    Ok(())
}

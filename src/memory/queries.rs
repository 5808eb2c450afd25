//! Prebuilt live queries for the memory and feedback panels.
//!
//! Each function returns a [`QueryKey`] with its parameters bound. Callers add
//! their own dependency keys (usually a mutation counter) before binding.

use crate::live::QueryKey;

use super::types::MemoryCategory;

/// Column list every memory query selects; [`super::types::Memory::from_row`] expects it.
pub const MEMORY_COLUMNS: &str = "id, content, importance, pinned, archived, source_message_id, \
     tags, created_at, updated_at, deleted_at, deleted_reason";

/// Column list every feedback query selects.
pub const FEEDBACK_COLUMNS: &str = "id, message_id, rating, note, created_at";

const LISTING_ORDER: &str = "ORDER BY pinned DESC, importance DESC, created_at DESC, id DESC";

/// One page of live (not deleted, not archived) memories, pinned first.
pub fn active_memories(limit: usize, offset: usize) -> QueryKey {
    QueryKey::new(format!(
        "SELECT {MEMORY_COLUMNS} FROM memories \
         WHERE deleted_at IS NULL AND archived = 0 {LISTING_ORDER} LIMIT ?1 OFFSET ?2"
    ))
    .param(limit)
    .param(offset)
}

/// Number of live memories across all pages, as a single `total` column.
pub fn active_memory_count() -> QueryKey {
    QueryKey::new(
        "SELECT COUNT(*) AS total FROM memories WHERE deleted_at IS NULL AND archived = 0",
    )
}

/// Archived memories that have not been deleted.
pub fn archived_memories(limit: usize) -> QueryKey {
    QueryKey::new(format!(
        "SELECT {MEMORY_COLUMNS} FROM memories \
         WHERE deleted_at IS NULL AND archived = 1 {LISTING_ORDER} LIMIT ?1"
    ))
    .param(limit)
}

/// Non-deleted memories whose content contains `text` (case-insensitive for
/// ASCII), optionally restricted to one category. Archived memories are
/// included so they can be found and restored.
pub fn search_memories(text: &str, category: Option<MemoryCategory>, limit: usize) -> QueryKey {
    let pattern = format!("%{}%", escape_like(text));
    let mut sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories \
         WHERE deleted_at IS NULL AND content LIKE ?1 ESCAPE '\\'"
    );

    match category {
        Some(category) => {
            let [a, b] = category.tags();
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(memories.tags) WHERE json_each.value IN (?3, ?4))",
            );
            sql.push_str(&format!(" {LISTING_ORDER} LIMIT ?2"));
            QueryKey::new(sql).param(pattern).param(limit).param(a).param(b)
        }
        None => {
            sql.push_str(&format!(" {LISTING_ORDER} LIMIT ?2"));
            QueryKey::new(sql).param(pattern).param(limit)
        }
    }
}

/// Live memories carrying any of `tags`. The tag list is bound as one JSON
/// array, so the key changes whenever the list does.
pub fn memories_by_tags(tags: &[String], limit: usize) -> QueryKey {
    let wanted = tags
        .iter()
        .map(String::as_str)
        .collect::<serde_json::Value>()
        .to_string();
    QueryKey::new(format!(
        "SELECT {MEMORY_COLUMNS} FROM memories \
         WHERE deleted_at IS NULL AND archived = 0 \
           AND EXISTS (SELECT 1 FROM json_each(memories.tags) AS have \
                       WHERE have.value IN (SELECT value FROM json_each(?1))) \
         {LISTING_ORDER} LIMIT ?2"
    ))
    .param(wanted)
    .param(limit)
}

/// Feedback for one chat message: zero or one row.
pub fn feedback_for_message(message_id: &str) -> QueryKey {
    QueryKey::new(format!(
        "SELECT {FEEDBACK_COLUMNS} FROM message_feedback WHERE message_id = ?1"
    ))
    .param(message_id)
}

/// One memory by id, including deleted ones.
pub fn memory_by_id(id: &str) -> QueryKey {
    QueryKey::new(format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1")).param(id)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

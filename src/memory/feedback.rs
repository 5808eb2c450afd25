//! Per-message feedback: one rating (and optional note) per chat message.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::queries;
use super::types::{Feedback, Rating};
use crate::query::fetch_rows;

/// Record feedback for `message_id`, replacing any earlier rating and note.
pub fn record_feedback(
    conn: &Connection,
    message_id: &str,
    rating: Rating,
    note: &str,
) -> Result<Feedback> {
    anyhow::ensure!(!message_id.is_empty(), "message id must not be empty");

    conn.execute(
        "INSERT INTO message_feedback (id, message_id, rating, note, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(message_id) DO UPDATE SET rating = excluded.rating, note = excluded.note",
        params![
            super::new_id("msgfb"),
            message_id,
            rating.as_i64(),
            note,
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .context("failed to record feedback")?;

    tracing::info!(message_id, rating = %rating, "feedback recorded");

    get_feedback(conn, message_id)?.context("feedback vanished after insert")
}

/// Feedback for `message_id`, if any.
pub fn get_feedback(conn: &Connection, message_id: &str) -> Result<Option<Feedback>> {
    let key = queries::feedback_for_message(message_id);
    let rows = fetch_rows(conn, key.query().unwrap_or_default(), key.params())?;
    rows.first().map(Feedback::from_row).transpose()
}

/// Remove feedback for `message_id`. Returns whether anything was removed.
pub fn clear_feedback(conn: &Connection, message_id: &str) -> Result<bool> {
    let removed = conn.execute(
        "DELETE FROM message_feedback WHERE message_id = ?1",
        params![message_id],
    )?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn record_then_replace() {
        let conn = db::open_memory_database().unwrap();

        let first = record_feedback(&conn, "msg_1", Rating::Up, "").unwrap();
        assert!(first.id.starts_with("msgfb_"));
        assert_eq!(first.rating, Rating::Up);

        let second = record_feedback(&conn, "msg_1", Rating::Down, "wrong answer").unwrap();
        assert_eq!(second.id, first.id, "upsert keeps the original row");
        assert_eq!(second.rating, Rating::Down);
        assert_eq!(second.note, "wrong answer");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM message_feedback", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn clear_removes_feedback() {
        let conn = db::open_memory_database().unwrap();
        record_feedback(&conn, "msg_2", Rating::Neutral, "").unwrap();

        assert!(clear_feedback(&conn, "msg_2").unwrap());
        assert!(!clear_feedback(&conn, "msg_2").unwrap());
        assert!(get_feedback(&conn, "msg_2").unwrap().is_none());
    }
}

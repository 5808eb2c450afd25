//! CLI `feedback` commands: rate a chat message and show or clear its rating.

use anyhow::Result;

use memlive::config::MemliveConfig;
use memlive::live::LiveQuery;
use memlive::memory::feedback;
use memlive::memory::queries;
use memlive::memory::types::{Feedback, Rating};

pub fn rate(config: &MemliveConfig, message_id: &str, rating: Rating, note: &str) -> Result<()> {
    let conn = super::open(config)?;
    let fb = feedback::record_feedback(&conn, message_id, rating, note)?;
    println!("Recorded {} for {}", fb.rating, fb.message_id);
    Ok(())
}

/// Show the rating for one message, rendered from a live binding.
pub fn show(config: &MemliveConfig, message_id: &str) -> Result<()> {
    let conn = super::open(config)?;
    let live = LiveQuery::bind(&conn, queries::feedback_for_message(message_id));

    if let Some(err) = live.error() {
        anyhow::bail!("query failed: {err}");
    }
    match live.data().first() {
        None => println!("No feedback for {message_id}."),
        Some(row) => {
            let fb = Feedback::from_row(row)?;
            println!("Message:  {}", fb.message_id);
            println!("Rating:   {}", fb.rating);
            if !fb.note.is_empty() {
                println!("Note:     {}", super::preview(&fb.note, 200));
            }
            println!("Recorded: {}", fb.created_at);
        }
    }
    Ok(())
}

pub fn clear(config: &MemliveConfig, message_id: &str) -> Result<()> {
    let conn = super::open(config)?;
    if feedback::clear_feedback(&conn, message_id)? {
        println!("Cleared feedback for {message_id}");
    } else {
        println!("No feedback for {message_id}.");
    }
    Ok(())
}

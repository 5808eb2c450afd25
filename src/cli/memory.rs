//! CLI `memory` commands.
//!
//! Listings are rendered from live bindings over the prebuilt panel queries.

use anyhow::{bail, Result};
use rusqlite::Connection;

use memlive::config::MemliveConfig;
use memlive::live::LiveQuery;
use memlive::memory::queries;
use memlive::memory::store::{self, MemoryUpdate};
use memlive::memory::types::{Memory, MemoryCategory};

/// Store a new memory and print its id.
pub fn add(
    config: &MemliveConfig,
    content: &str,
    importance: Option<f64>,
    tags: &[String],
    source_message: Option<&str>,
) -> Result<()> {
    let conn = super::open(config)?;
    let importance = importance.unwrap_or(config.memory.default_importance);
    let mem = store::create_memory(&conn, content, importance, tags, source_message)?;

    println!("Stored memory {}", mem.id);
    if let Some(category) = mem.category() {
        println!("  Category:   {category}");
    }
    Ok(())
}

/// List active (or archived) memories.
pub fn list(
    config: &MemliveConfig,
    archived: bool,
    limit: Option<usize>,
    offset: usize,
) -> Result<()> {
    let conn = super::open(config)?;
    let limit = limit.unwrap_or(config.memory.page_size);
    if archived {
        return render(&conn, queries::archived_memories(limit), "No archived memories.");
    }

    let count = LiveQuery::bind(&conn, queries::active_memory_count());
    if let Some(err) = count.error() {
        bail!("count failed: {err}");
    }
    let total = count
        .data()
        .first()
        .and_then(|row| row.get("total"))
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    render(&conn, queries::active_memories(limit, offset), "No memories.")?;
    let shown_to = (offset + limit).min(usize::try_from(total)?);
    if shown_to > offset {
        println!("Showing {}-{shown_to} of {total}", offset + 1);
    }
    Ok(())
}

/// List live memories carrying any of `tags`.
pub fn tagged(config: &MemliveConfig, tags: &[String], limit: Option<usize>) -> Result<()> {
    if tags.is_empty() {
        bail!("give at least one tag");
    }
    let conn = super::open(config)?;
    let limit = limit.unwrap_or(config.memory.page_size);
    render(
        &conn,
        queries::memories_by_tags(tags, limit),
        "No memories with those tags.",
    )
}

/// Add a tag to a memory.
pub fn tag(config: &MemliveConfig, id: &str, tag: &str) -> Result<()> {
    let conn = super::open(config)?;
    let mem = store::add_tag(&conn, id, tag)?;
    println!("Tags on {id}: {}", mem.tags.join(", "));
    Ok(())
}

/// Remove a tag from a memory.
pub fn untag(config: &MemliveConfig, id: &str, tag: &str) -> Result<()> {
    let conn = super::open(config)?;
    let mem = store::remove_tag(&conn, id, tag)?;
    if mem.tags.is_empty() {
        println!("No tags left on {id}");
    } else {
        println!("Tags on {id}: {}", mem.tags.join(", "));
    }
    Ok(())
}

/// Search memory content, optionally within one category.
pub fn search(
    config: &MemliveConfig,
    text: &str,
    category: Option<MemoryCategory>,
    limit: Option<usize>,
) -> Result<()> {
    let conn = super::open(config)?;
    let limit = limit.unwrap_or(config.memory.search_limit);
    render(
        &conn,
        queries::search_memories(text, category, limit),
        "No matching memories.",
    )
}

pub fn pin(config: &MemliveConfig, id: &str, pinned: bool) -> Result<()> {
    let conn = super::open(config)?;
    store::set_pinned(&conn, id, pinned)?;
    println!("{} {id}", if pinned { "Pinned" } else { "Unpinned" });
    Ok(())
}

pub fn archive(config: &MemliveConfig, id: &str, archived: bool) -> Result<()> {
    let conn = super::open(config)?;
    store::set_archived(&conn, id, archived)?;
    println!("{} {id}", if archived { "Archived" } else { "Restored" });
    Ok(())
}

pub fn forget(config: &MemliveConfig, id: &str, reason: Option<&str>) -> Result<()> {
    let conn = super::open(config)?;
    store::delete_memory(&conn, id, reason)?;
    println!("Forgot {id}");
    Ok(())
}

/// Edit content, importance, or tags of a memory.
pub fn edit(config: &MemliveConfig, id: &str, update: &MemoryUpdate) -> Result<()> {
    let conn = super::open(config)?;
    let mem = store::update_memory(&conn, id, update)?;
    print_memory(1, &mem);
    Ok(())
}

fn render(conn: &Connection, key: memlive::live::QueryKey, empty: &str) -> Result<()> {
    let live = LiveQuery::bind(conn, key);

    if let Some(err) = live.error() {
        bail!("query failed: {err}");
    }
    if live.data().is_empty() {
        println!("{empty}");
        return Ok(());
    }

    for (i, row) in live.data().iter().enumerate() {
        let mem = Memory::from_row(row)?;
        print_memory(i + 1, &mem);
    }
    Ok(())
}

fn print_memory(n: usize, mem: &Memory) {
    let mut marks = String::new();
    if mem.pinned {
        marks.push_str(" [pinned]");
    }
    if mem.archived {
        marks.push_str(" [archived]");
    }
    let category = mem
        .category()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".into());

    println!(
        "  {n}. {} ({category}, importance: {:.2}){marks}",
        mem.id, mem.importance
    );
    println!("     {}", super::preview(&mem.content, 120));
    if !mem.tags.is_empty() {
        println!("     tags: {}", mem.tags.join(", "));
    }
    println!();
}

//! Memory and feedback record types.
//!
//! Defines [`Memory`] (one stored memory), [`MemoryCategory`] (derived from
//! tags), [`Feedback`] and its [`Rating`]. Records are built from live-query
//! [`Row`]s rather than from raw SQLite rows, so panels and store reads share
//! one decoding path.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::query::{Row, Scalar};

/// What kind of memory this is, inferred from its tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    /// Likes, dislikes, and how the user wants things done.
    Preference,
    /// Things that are true about the user or the world.
    Fact,
    /// Standing rules the assistant should follow.
    Instruction,
    /// Background about the user's situation.
    Context,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 4] = [
        Self::Preference,
        Self::Fact,
        Self::Instruction,
        Self::Context,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preference => "preference",
            Self::Fact => "fact",
            Self::Instruction => "instruction",
            Self::Context => "context",
        }
    }

    /// Tags that mark a memory as this category.
    pub fn tags(&self) -> [&'static str; 2] {
        match self {
            Self::Preference => ["preference", "user_preference"],
            Self::Fact => ["fact", "knowledge"],
            Self::Instruction => ["instruction", "rule"],
            Self::Context => ["context", "background"],
        }
    }

    /// Category of the first tag that names one, if any.
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Option<Self> {
        tags.iter().find_map(|tag| {
            Self::ALL
                .into_iter()
                .find(|category| category.tags().contains(&tag.as_ref()))
        })
    }
}

impl std::fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preference" => Ok(Self::Preference),
            "fact" => Ok(Self::Fact),
            "instruction" => Ok(Self::Instruction),
            "context" => Ok(Self::Context),
            _ => Err(format!("unknown memory category: {s}")),
        }
    }
}

/// A memory record, matching the `memories` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// `mem_` followed by a UUID v7.
    pub id: String,
    pub content: String,
    /// In `[0.0, 1.0]`; higher sorts first in listings.
    pub importance: f64,
    /// Pinned memories sort ahead of everything else.
    pub pinned: bool,
    /// Archived memories are hidden from the default listing.
    pub archived: bool,
    /// Chat message the memory was extracted from, if any.
    pub source_message_id: Option<String>,
    pub tags: Vec<String>,
    /// RFC 3339 timestamps.
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
    pub deleted_reason: Option<String>,
}

impl Memory {
    pub fn category(&self) -> Option<MemoryCategory> {
        MemoryCategory::from_tags(&self.tags)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Decode a row selected with [`crate::memory::queries::MEMORY_COLUMNS`].
    pub fn from_row(row: &Row) -> Result<Self> {
        let tags_json = text(row, "tags")?;
        let tags: Vec<String> = serde_json::from_str(&tags_json)
            .with_context(|| format!("invalid tags on memory: {tags_json}"))?;

        Ok(Self {
            id: text(row, "id")?,
            content: text(row, "content")?,
            importance: real(row, "importance")?,
            pinned: flag(row, "pinned")?,
            archived: flag(row, "archived")?,
            source_message_id: opt_text(row, "source_message_id")?,
            tags,
            created_at: text(row, "created_at")?,
            updated_at: text(row, "updated_at")?,
            deleted_at: opt_text(row, "deleted_at")?,
            deleted_reason: opt_text(row, "deleted_reason")?,
        })
    }
}

/// Thumbs up / neutral / thumbs down on a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Down,
    Neutral,
    Up,
}

impl Rating {
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Down => -1,
            Self::Neutral => 0,
            Self::Up => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Down),
            0 => Some(Self::Neutral),
            1 => Some(Self::Up),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Neutral => "neutral",
            Self::Up => "up",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" | "+1" | "1" => Ok(Self::Up),
            "neutral" | "0" => Ok(Self::Neutral),
            "down" | "-1" => Ok(Self::Down),
            _ => Err(format!("unknown rating: {s} (expected up, down or neutral)")),
        }
    }
}

/// Feedback left on one chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// `msgfb_` followed by a UUID v7.
    pub id: String,
    pub message_id: String,
    pub rating: Rating,
    pub note: String,
    pub created_at: String,
}

impl Feedback {
    /// Decode a row selected with [`crate::memory::queries::FEEDBACK_COLUMNS`].
    pub fn from_row(row: &Row) -> Result<Self> {
        let raw = integer(row, "rating")?;
        let rating = Rating::from_i64(raw).ok_or_else(|| anyhow!("invalid rating value: {raw}"))?;
        Ok(Self {
            id: text(row, "id")?,
            message_id: text(row, "message_id")?,
            rating,
            note: text(row, "note")?,
            created_at: text(row, "created_at")?,
        })
    }
}

fn column<'r>(row: &'r Row, name: &str) -> Result<&'r Scalar> {
    row.get(name).ok_or_else(|| anyhow!("missing column: {name}"))
}

fn text(row: &Row, name: &str) -> Result<String> {
    column(row, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("column {name} is not text"))
}

fn opt_text(row: &Row, name: &str) -> Result<Option<String>> {
    match column(row, name)? {
        Scalar::Null => Ok(None),
        Scalar::Text(s) => Ok(Some(s.clone())),
        other => Err(anyhow!("column {name} is not text: {other}")),
    }
}

fn integer(row: &Row, name: &str) -> Result<i64> {
    column(row, name)?
        .as_i64()
        .ok_or_else(|| anyhow!("column {name} is not an integer"))
}

fn real(row: &Row, name: &str) -> Result<f64> {
    column(row, name)?
        .as_f64()
        .ok_or_else(|| anyhow!("column {name} is not numeric"))
}

fn flag(row: &Row, name: &str) -> Result<bool> {
    Ok(integer(row, name)? != 0)
}

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memlive::config::MemliveConfig;
use memlive::memory::store::MemoryUpdate;
use memlive::memory::types::{MemoryCategory, Rating};

#[derive(Parser)]
#[command(name = "memlive", version, about = "Memories and feedback over live SQLite queries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a SQL query once through a live binding and print the rows
    Query {
        sql: String,
        /// Bound parameter (repeatable): null, an integer, a real, or text
        #[arg(short, long = "param")]
        params: Vec<String>,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage memories
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Rate a chat message, or show its rating
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
    /// Run database diagnostics
    Doctor,
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Store a new memory
    Add {
        content: String,
        #[arg(long)]
        importance: Option<f64>,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        source_message: Option<String>,
    },
    /// Change content, importance, or tags of a memory
    Edit {
        id: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        importance: Option<f64>,
        /// Replace all tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// List memories, pinned first
    List {
        #[arg(long)]
        archived: bool,
        #[arg(long)]
        limit: Option<usize>,
        /// Skip this many memories (active list only)
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// List memories carrying any of the given tags
    Tagged {
        #[arg(required = true)]
        tags: Vec<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Add a tag to a memory
    Tag { id: String, tag: String },
    /// Remove a tag from a memory
    Untag { id: String, tag: String },
    /// Search memory content
    Search {
        text: String,
        #[arg(short, long)]
        category: Option<MemoryCategory>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Pin a memory (or unpin with --off)
    Pin {
        id: String,
        #[arg(long)]
        off: bool,
    },
    /// Archive a memory (or restore with --off)
    Archive {
        id: String,
        #[arg(long)]
        off: bool,
    },
    /// Delete a memory
    Forget {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
enum FeedbackAction {
    /// Record a rating: up, down or neutral
    Rate {
        message_id: String,
        /// up, down, neutral, or 1, -1, 0
        #[arg(allow_negative_numbers = true)]
        rating: Rating,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Show the rating for a message
    Show { message_id: String },
    /// Remove the rating for a message
    Clear { message_id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = MemliveConfig::load()?;

    // Log to stderr so stdout stays clean for query output.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Query { sql, params, json } => cli::query::query(&config, &sql, &params, json),
        Command::Memory { action } => match action {
            MemoryAction::Add {
                content,
                importance,
                tags,
                source_message,
            } => cli::memory::add(&config, &content, importance, &tags, source_message.as_deref()),
            MemoryAction::Edit {
                id,
                content,
                importance,
                tags,
            } => {
                let update = MemoryUpdate {
                    content,
                    importance,
                    tags: (!tags.is_empty()).then_some(tags),
                };
                cli::memory::edit(&config, &id, &update)
            }
            MemoryAction::List {
                archived,
                limit,
                offset,
            } => cli::memory::list(&config, archived, limit, offset),
            MemoryAction::Tagged { tags, limit } => cli::memory::tagged(&config, &tags, limit),
            MemoryAction::Tag { id, tag } => cli::memory::tag(&config, &id, &tag),
            MemoryAction::Untag { id, tag } => cli::memory::untag(&config, &id, &tag),
            MemoryAction::Search {
                text,
                category,
                limit,
            } => cli::memory::search(&config, &text, category, limit),
            MemoryAction::Pin { id, off } => cli::memory::pin(&config, &id, !off),
            MemoryAction::Archive { id, off } => cli::memory::archive(&config, &id, !off),
            MemoryAction::Forget { id, reason } => {
                cli::memory::forget(&config, &id, reason.as_deref())
            }
        },
        Command::Feedback { action } => match action {
            FeedbackAction::Rate {
                message_id,
                rating,
                note,
            } => cli::feedback::rate(&config, &message_id, rating, &note),
            FeedbackAction::Show { message_id } => cli::feedback::show(&config, &message_id),
            FeedbackAction::Clear { message_id } => cli::feedback::clear(&config, &message_id),
        },
        Command::Doctor => cli::doctor::doctor(&config),
    }
}

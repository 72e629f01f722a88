use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Single-device note keeper")]
pub struct CliConfig {
    /// Note document; overrides WORKNOTE_DOCUMENT_PATH.
    #[arg(long, global = true)]
    pub document: Option<PathBuf>,

    /// Absolute log directory; overrides WORKNOTE_LOG_DIR.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level; overrides WORKNOTE_LOG_LEVEL.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Print the filtered, sorted note list.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = false)]
        favorites: bool,
        /// newest|oldest|title-asc|title-desc
        #[arg(long, default_value = "newest")]
        sort: String,
    },
    /// Create a note.
    New {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Change fields of an existing note.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// draft|active|archived|completed
        #[arg(long)]
        status: Option<String>,
        /// black|blue|green|orange|pink
        #[arg(long)]
        color: Option<String>,
    },
    /// Show one note and count the view.
    Show { id: String },
    /// Toggle the favorite flag.
    Favorite { id: String },
    /// Delete a note. Unknown ids are ignored.
    Delete { id: String },
    /// Print the core version.
    Version,
}

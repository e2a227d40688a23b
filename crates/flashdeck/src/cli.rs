//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flashdeck_core::{CardId, Collection};

#[derive(Parser, Debug)]
#[command(name = "flashdeck")]
#[command(about = "Translate short snippets and drill them as flashcards")]
#[command(version)]
pub struct Cli {
    /// SQLite database file (default: <data dir>/flashdeck/flashdeck.db)
    #[arg(long, env = "FLASHDECK_DB", global = true)]
    pub db: Option<PathBuf>,

    /// JSON file of legacy key/value data to import once
    #[arg(long, env = "FLASHDECK_LEGACY_FILE", global = true)]
    pub legacy_file: Option<PathBuf>,

    /// Google Translate API key
    #[arg(long, env = "GOOGLE_TRANSLATE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Translation endpoint override
    #[arg(long, env = "FLASHDECK_TRANSLATE_URL", global = true)]
    pub translate_url: Option<String>,

    /// Log level when RUST_LOG is unset (debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print cards
    List {
        /// Only this collection (active, known, unknown)
        #[arg(long, value_parser = parse_collection)]
        collection: Option<Collection>,

        /// Only cards whose source or target language matches
        #[arg(long)]
        language: Option<String>,
    },

    /// Create a card in active
    Add {
        source: String,
        translated: String,

        /// Source language
        #[arg(long)]
        from: String,

        /// Target language
        #[arg(long)]
        to: String,
    },

    /// Translate a snippet
    Translate {
        text: String,

        /// Source language code (default: last used)
        #[arg(long)]
        from: Option<String>,

        /// Target language code (default: last used)
        #[arg(long)]
        to: Option<String>,

        /// Add the translation to practice
        #[arg(long)]
        save: bool,
    },

    /// Move a card to active, known or unknown
    Mark {
        id: CardId,

        #[arg(value_parser = parse_collection)]
        destination: Collection,
    },

    /// Delete a card
    Delete { id: CardId },

    /// Move every known and unknown card back to active
    Reset,

    /// Move unknown cards back to active
    PracticeUnknown {
        /// Language filter (default: the saved selectedLanguage)
        #[arg(long)]
        language: Option<String>,
    },

    /// Drill active cards, reading answers from stdin
    ///
    /// k marks the card known, u unknown, n skips, p goes back, q quits.
    Practice {
        /// Language filter (default: the saved selectedLanguage)
        #[arg(long)]
        language: Option<String>,

        /// Shuffle the queue first
        #[arg(long)]
        shuffle: bool,
    },

    /// List the languages used by stored cards
    Languages,

    /// Read or write a setting
    Setting {
        #[command(subcommand)]
        action: SettingAction,
    },

    /// Import the legacy file now and report what was imported
    Migrate,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingAction {
    /// Print a setting, initializing it with the default if absent
    Get {
        key: String,

        /// JSON default written when the key is absent
        #[arg(long, default_value = "null")]
        default: String,
    },

    /// Store a JSON value
    Set { key: String, value: String },
}

fn parse_collection(s: &str) -> Result<Collection, String> {
    Collection::parse(s).ok_or_else(|| format!("unknown collection '{}'", s))
}

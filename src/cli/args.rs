// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// External key-value store URL; without it data lives in memory only
    #[arg(long, value_name = "URL", env = "FLASHDECK_STORE_URL", global = true)]
    pub store_url: Option<String>,

    /// Bearer token for the external store
    #[arg(
        long,
        value_name = "TOKEN",
        env = "FLASHDECK_STORE_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub store_token: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the JSON API
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(short, long, value_name = "ADDR", env = "FLASHDECK_BIND")]
        bind: Option<String>,
    },

    /// List flashcards, optionally only those of one set
    List {
        /// Set name (case-insensitive)
        #[arg(value_name = "SET")]
        set: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List sets with their card counts
    Sets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a flashcard
    Add {
        #[arg(value_name = "FRONT")]
        front: String,

        #[arg(value_name = "BACK")]
        back: String,

        /// Set to file the card under (default: General)
        #[arg(short, long, value_name = "SET")]
        set: Option<String>,
    },

    /// Delete a flashcard
    Delete {
        /// Flashcard ID to delete
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Write a config file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create a set, starting with a placeholder card
    NewSet {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(short, long, value_name = "TEXT")]
        description: Option<String>,
    },
}

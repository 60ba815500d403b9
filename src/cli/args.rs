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

    /// API base URL, overrides config and NOTEHUB_BASE_URL
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token, overrides config and NOTEHUB_TOKEN
    #[arg(long, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List one page of notes
    List {
        /// Optional search term
        #[arg(value_name = "SEARCH", default_value = "")]
        search: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Output the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        #[arg(long, default_value = "Todo")]
        tag: String,
    },

    /// Delete a note by id
    Delete {
        /// Note ID to delete
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Interactive session: type to search, `:help` for commands
    Browse,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

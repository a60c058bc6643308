pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chapterwatch")]
#[command(about = "Watches manga series pages and announces new chapters", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a series (or update an existing registration)
    Add {
        /// Unique series key
        id: String,
        /// Display name
        title: String,
        /// Series page URL
        url: String,
        /// Site-scan tag (manhuaplus, asurascans)
        scan: String,
        /// Comma-separated check hours, e.g. "6,12,18"
        check_hours: String,
    },
    /// Unregister a series
    Remove {
        /// Series key
        id: String,
    },
    /// List registered series
    List,
    /// Fetch and print the latest chapter for a series
    Latest {
        /// Series key
        id: String,
    },
    /// Show the next scheduled check per series
    Next,
    /// Watch all registered series until terminated
    Start,
}

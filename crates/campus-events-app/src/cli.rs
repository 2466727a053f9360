//! Command-line interface definition.

use std::path::PathBuf;

use campus_events_core::{Disclosure, OutputFormat};
use clap::{Parser, Subcommand};

/// campus-events - today's campus events at a glance
#[derive(Debug, Parser)]
#[command(name = "campus-events")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CAMPUS_EVENTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    // --- Display options ---
    /// Only show events matching this text
    #[arg(long, short)]
    pub filter: Option<String>,

    /// Show the description of this event id (e.g. general-3)
    #[arg(long, conflicts_with = "expand_all")]
    pub open: Option<String>,

    /// Show every event description
    #[arg(long)]
    pub expand_all: bool,

    /// Maximum title length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,

    /// Do not fetch the announcement banner
    #[arg(long)]
    pub no_announcement: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Returns the initial disclosure state.
    pub fn disclosure(&self) -> Disclosure {
        let mut disclosure = Disclosure::default();
        if let Some(id) = &self.open {
            disclosure.toggle(id);
        }
        disclosure
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search every loaded event, beyond the day window
    Search {
        /// Text to look for in titles, times, dates and descriptions
        query: String,
    },

    /// Show the offline cache generation and its manifest
    Cache {
        /// Pre-cache the manifest from the site origin
        #[arg(long)]
        install: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

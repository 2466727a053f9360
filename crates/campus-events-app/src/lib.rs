//! CLI, config file, concurrent feed loading, page assembly
//!
//! This crate provides the `campus-events` command-line interface.

pub mod announcement;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod page;

pub use cli::Cli;
pub use config::AppConfig;
pub use error::{AppError, AppResult, ConfigError};
pub use loader::{FeedLoader, FeedOutcome, LoadStatus, LoadedFeeds, LoaderConfig};

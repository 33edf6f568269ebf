//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `seed` - Demo tables and starter menu
//! - `staff` - Role changes that used to live in the back office

pub mod args;

pub use args::{Cli, Commands};

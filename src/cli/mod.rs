//! CLI module for the Campus Market API
//!
//! Provides subcommands for running the service:
//! - `serve`: run the HTTP API (default)
//! - `migrate`: create the database schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Campus Market - second-hand marketplace API
#[derive(Parser)]
#[command(name = "campus-market")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,

    /// Create the database schema and exit
    Migrate,
}

//! CLI module
//!
//! Subcommands for running the service:
//! - `serve`: run the HTTP API with the background expiry reaper

pub mod serve;

use clap::{Parser, Subcommand};

/// Session key authorization and spend accounting service
#[derive(Parser)]
#[command(name = "session-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}

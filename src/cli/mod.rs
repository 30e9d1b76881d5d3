//! CLI module for the catalog agent API

pub mod serve;

use clap::{Parser, Subcommand};

/// Supplier/product catalog API with an LLM-backed SQL agent
#[derive(Parser)]
#[command(name = "catalog-agent-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}

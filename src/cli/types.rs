//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "attainment")]
#[command(about = "Attainment - assessment score propagation service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this YAML file instead of .attainment/
    #[arg(short, long, global = true, env = "ATTAINMENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeArgs),

    /// Create the database if needed and apply pending migrations
    Migrate,

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

//! CLI interface for MagicStream

pub mod commands;
mod output;

pub use output::*;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "magicstream")]
#[command(version)]
#[command(about = "Movie catalog backend with cookie based JWT sessions", long_about = None)]
pub struct Cli {
    /// Path to magicstream.toml (searched upward from the working directory by default)
    #[arg(short, long, global = true, env = "MAGICSTREAM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter magicstream.toml with fresh signing secrets
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate the configuration and store connectivity
    Check,

    /// List the movies in the catalog
    Movies {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Load genres, rankings and movies from a YAML file
    Seed {
        /// YAML file with `genres`, `rankings` and `movies`
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

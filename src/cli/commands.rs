//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CRUD over HTTP for DuckDB tables
#[derive(Parser, Debug)]
#[command(name = "tablecrud")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path, overrides `database.path` (use ":memory:" for in-memory)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level for the tracing subscriber: `debug` with `--verbose`, else `info`
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Port to listen on, overrides `server.port`
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind, overrides `server.host`
        #[arg(long)]
        host: Option<String>,
    },

    /// Fetch one page of a resource
    Find {
        /// Resource name
        resource: String,

        /// Equality filter `field=value` (repeatable)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,

        /// Sort fields, e.g. "age,desc,name"
        #[arg(short, long, default_value = "")]
        order: String,

        /// Fields to return, e.g. "name,age"
        #[arg(short, long, default_value = "")]
        select: String,

        /// Page size (0 = configured default)
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Cursor from a previous page
        #[arg(long, default_value = "")]
        cursor: String,

        /// Page number reported in metadata
        #[arg(long, default_value = "0")]
        page: u32,
    },

    /// Fetch one record by key
    Get {
        /// Resource name
        resource: String,

        /// Record key
        key: String,

        /// Fields to return, e.g. "name,age"
        #[arg(short, long, default_value = "")]
        select: String,
    },

    /// List tables in the database
    Tables,

    /// Validate configuration and test the database connection
    Check,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Indented JSON
    Pretty,
}

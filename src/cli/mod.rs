//! CLI module
//!
//! Command-line interface for serving and querying tables.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `find` - Fetch one page of a resource
//! - `get` - Fetch one record by key
//! - `tables` - List tables in the database
//! - `check` - Validate configuration and test the database

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve};

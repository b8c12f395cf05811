// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tablecrud
//!
//! CRUD over HTTP for DuckDB tables, with cursor-based pagination.
//!
//! ## Features
//!
//! - **Keyset Pagination**: Stable, resumable pages without offset arithmetic
//! - **Opaque Cursors**: Base64 tokens derived from the last returned key
//! - **Static Models**: Per-model conversions through the `Model` trait
//! - **REST Routes**: One resource per configured table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tablecrud::config::PaginationConfig;
//! use tablecrud::database::Database;
//! use tablecrud::service::{CrudService, Document, FindQuery};
//!
//! let db = Arc::new(Database::open("data.duckdb")?);
//! let users: CrudService<Document> = CrudService::new(db, "users", PaginationConfig::default());
//!
//! let query = FindQuery { limit: 10, order: "age,desc".into(), ..FindQuery::default() };
//! let page = users.find(&Document::new(), &query)?;
//! // page.meta.cursor resumes after the last returned record
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              HTTP (axum) / CLI (clap)  ──  cli                  │
//! │  POST /{name}   GET /{name}   GET|PUT|PATCH|DELETE /{name}/{key}│
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │                CrudService<M: Model>  ──  service               │
//! │      Binding → Model → to_create / to_update / to_query         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │   Paginator  ──  pagination         Table  ──  database         │
//! │   limit + 1 → trim → cursor    ◀─▶  keyset resume, CRUD (DuckDB)│
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for tablecrud
pub mod error;

/// Common types and type aliases
pub mod types;

/// Cursor-based pagination
pub mod pagination;

/// Database support via DuckDB
pub mod database;

/// CRUD service and request binding
pub mod service;

/// YAML application configuration
pub mod config;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use pagination::{Keyed, Page, Paginator};
pub use service::{CrudService, Document, Model};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

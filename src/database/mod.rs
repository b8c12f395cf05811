//! Database support via DuckDB
//!
//! This module is the data store behind the CRUD service: a [`Database`]
//! hands out [`Table`]s, and a table runs keyset page queries plus
//! single-row writes.

mod engine;
mod sql;
mod table;
mod value;

pub use engine::{Database, MEMORY};
pub use sql::{quote_identifier, Filter};
pub use table::{Table, TablePage};
pub use value::{duckdb_to_json, json_to_duckdb};

#[cfg(test)]
mod tests;

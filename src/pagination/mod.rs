//! Pagination module
//!
//! Cursor-based (keyset) pagination over any [`PageSource`].
//!
//! # Overview
//!
//! A [`Paginator`] turns a filter, an ordered list of sort keys, a projection
//! and a page size into one bounded query. It asks for one row more than the
//! page size; if that sentinel row comes back, more pages exist and the
//! paginator emits an opaque cursor derived from the last kept record's key.
//! Feeding that cursor into a fresh paginator resumes right after it.
//!
//! ```text
//!  cursor ──base64 decode──▶ resume_from(key)
//!                                   │
//!  select/filter/order ──▶ PageQuery(limit + 1) ──▶ decode_all ──▶ trim ──▶ next cursor
//! ```

mod cursor;
mod paginator;
mod types;

pub use cursor::{decode_cursor, encode_cursor};
pub use paginator::Paginator;
pub use types::{
    Keyed, Meta, OrderSpec, Page, PageHandle, PageQuery, PageSource, SelectSpec,
};

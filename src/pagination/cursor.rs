//! Cursor token codec
//!
//! A cursor is the standard base64 encoding of the text form of a record key.

use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode a key into an opaque cursor
pub fn encode_cursor(key: &str) -> String {
    STANDARD.encode(key.as_bytes())
}

/// Decode a cursor into the raw key bytes. An empty cursor means "first page".
pub fn decode_cursor(cursor: &str) -> Result<Option<Vec<u8>>> {
    if cursor.is_empty() {
        return Ok(None);
    }
    Ok(Some(STANDARD.decode(cursor)?))
}

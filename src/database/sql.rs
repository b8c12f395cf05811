//! SQL fragments for table queries
//!
//! Identifiers are validated and double-quoted; every value is bound as a
//! parameter.

use super::value::json_to_duckdb;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, SortDirection};
use duckdb::types::Value;
use regex::Regex;
use std::sync::LazyLock;

/// Plain SQL identifier: letters, digits, underscore, not starting with a digit
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Validate an identifier and return it double-quoted
pub fn quote_identifier(name: &str) -> Result<String> {
    if !IDENTIFIER_REGEX.is_match(name) {
        return Err(Error::invalid_identifier(name));
    }
    Ok(format!("\"{name}\""))
}

// ============================================================================
// Filter
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// `column = value`, or `column IS NULL` for null
    Equals(String, JsonValue),
    /// `CAST(column AS VARCHAR) = text`, used for key lookups
    TextEquals(String, String),
}

/// Conjunction of equality conditions, kept in insertion order
///
/// A `null` value matches with `IS NULL`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Create an empty (match everything) filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.conditions
            .push(Condition::Equals(column.into(), value.into()));
        self
    }

    /// Add a condition matching the column's text form, the same way cursors
    /// and key lookups compare keys
    pub fn text_eq(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::TextEquals(column.into(), text.into()));
        self
    }

    /// One condition per object entry
    pub fn from_object(object: &JsonObject) -> Self {
        Self {
            conditions: object
                .iter()
                .map(|(k, v)| Condition::Equals(k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Render to a SQL condition, appending bound values to `params`
    pub(crate) fn to_sql(&self, params: &mut Vec<Value>) -> Result<Option<String>> {
        if self.conditions.is_empty() {
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            match condition {
                Condition::Equals(column, value) if value.is_null() => {
                    parts.push(format!("{} IS NULL", quote_identifier(column)?));
                }
                Condition::Equals(column, value) => {
                    parts.push(format!("{} = ?", quote_identifier(column)?));
                    params.push(json_to_duckdb(value));
                }
                Condition::TextEquals(column, text) => {
                    parts.push(format!("CAST({} AS VARCHAR) = ?", quote_identifier(column)?));
                    params.push(Value::Text(text.clone()));
                }
            }
        }
        Ok(Some(parts.join(" AND ")))
    }
}

// ============================================================================
// Keyset
// ============================================================================

/// Build the "strictly after the anchor" predicate for the given sort keys.
///
/// For keys `c1..cn` with anchor values `v1..vn` this is
/// `(c1 op v1) OR (c1 = v1 AND c2 op v2) OR ...` where `op` is `>` for
/// ascending keys and `<` for descending ones.
///
/// Rows are ordered `NULLS LAST` in both directions, so a non-null anchor
/// value is also followed by every NULL in that column, a NULL anchor value
/// is followed by nothing in that column, and equality terms use
/// `IS NOT DISTINCT FROM` (or `IS NULL` for a NULL anchor).
pub fn keyset_predicate(
    keys: &[(String, SortDirection)],
    anchor: &[Value],
    params: &mut Vec<Value>,
) -> Result<String> {
    if keys.len() != anchor.len() {
        return Err(Error::query(format!(
            "Keyset has {} columns but anchor has {} values",
            keys.len(),
            anchor.len()
        )));
    }

    let quoted = keys
        .iter()
        .map(|(column, _)| quote_identifier(column))
        .collect::<Result<Vec<_>>>()?;

    let mut branches = Vec::with_capacity(keys.len());
    for (i, (_, direction)) in keys.iter().enumerate() {
        if anchor[i] == Value::Null {
            continue;
        }

        let mut terms = Vec::with_capacity(i + 1);
        for (column, value) in quoted.iter().zip(anchor).take(i) {
            if *value == Value::Null {
                terms.push(format!("{column} IS NULL"));
            } else {
                terms.push(format!("{column} IS NOT DISTINCT FROM ?"));
                params.push(value.clone());
            }
        }
        let op = if direction.is_descending() { "<" } else { ">" };
        terms.push(format!("({0} {op} ? OR {0} IS NULL)", quoted[i]));
        params.push(anchor[i].clone());
        branches.push(format!("({})", terms.join(" AND ")));
    }

    if branches.is_empty() {
        return Ok("FALSE".to_string());
    }
    Ok(format!("({})", branches.join(" OR ")))
}

/// Column list for an INSERT: `("a", "b")` and matching `(?, ?)`
pub fn insert_columns(row: &JsonObject, params: &mut Vec<Value>) -> Result<(String, String)> {
    let mut columns = Vec::with_capacity(row.len());
    for (column, value) in row {
        columns.push(quote_identifier(column)?);
        params.push(json_to_duckdb(value));
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok((columns.join(", "), placeholders))
}

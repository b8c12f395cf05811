//! Request binding
//!
//! Turns query-string parameters, a path key and a JSON body into a model
//! instance and the pagination fields of a list request.

use super::model::Model;
use crate::config::PaginationConfig;
use crate::database::Filter;
use crate::error::{Error, Result};
use crate::pagination::{OrderSpec, Paginator, SelectSpec};
use crate::types::{JsonObject, JsonValue, SortDirection, StringMap};

/// Query parameters consumed by pagination and never bound into a model
pub const RESERVED_PARAMS: [&str; 5] = ["cursor", "page", "limit", "order", "select"];

/// Parameters of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    /// Cursor from a previous page
    pub cursor: String,
    /// Informative page number
    pub page: u32,
    /// Requested page size (0 = default)
    pub limit: usize,
    /// Comma list of fields; a `desc` token marks the preceding field descending
    pub order: String,
    /// Comma list of fields to return
    pub select: String,
}

impl FindQuery {
    /// Read the reserved parameters from a query string map
    pub fn from_params(params: &StringMap) -> Result<Self> {
        Ok(Self {
            cursor: params.get("cursor").cloned().unwrap_or_default(),
            page: parse_number(params, "page")?,
            limit: parse_number(params, "limit")?,
            order: params.get("order").cloned().unwrap_or_default(),
            select: params.get("select").cloned().unwrap_or_default(),
        })
    }

    /// Page size after applying configured bounds
    pub fn resolve_limit(&self, bounds: &PaginationConfig) -> usize {
        bounds.resolve(self.limit)
    }

    /// Build the paginator for this request
    pub fn paginator(&self, bounds: &PaginationConfig, filter: Filter) -> Paginator<Filter> {
        Paginator::new()
            .with_cursor(self.cursor.clone())
            .with_page(self.page)
            .with_limit(self.resolve_limit(bounds))
            .with_order(parse_order(&self.order))
            .with_select(parse_select(&self.select))
            .with_filter(filter)
    }
}

/// Parameters of a single-record request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetQuery {
    /// Comma list of fields to return
    pub select: String,
}

impl GetQuery {
    pub fn from_params(params: &StringMap) -> Self {
        Self {
            select: params.get("select").cloned().unwrap_or_default(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(params: &StringMap, name: &str) -> Result<T>
where
    T: Default,
{
    match params.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(T::default()),
        Some(raw) => raw.parse().map_err(|_| {
            Error::invalid_request(format!("'{name}' must be a non-negative integer, got '{raw}'"))
        }),
    }
}

/// Parse an order list such as `name,desc,age`
///
/// Fields are ascending unless followed by a `desc` token. Empty tokens and a
/// leading `desc` are ignored.
pub fn parse_order(raw: &str) -> OrderSpec {
    let mut order = OrderSpec::new();
    let mut last: Option<&str> = None;
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.eq_ignore_ascii_case("desc") {
            if let Some(field) = last.take() {
                order.push(field, SortDirection::Descending);
            }
            continue;
        }
        order.push(token, SortDirection::Ascending);
        last = Some(token);
    }
    order
}

/// Parse a select list such as `name,age`
pub fn parse_select(raw: &str) -> SelectSpec {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Coerce a query-string value to the JSON scalar it spells
///
/// Only exact spellings convert, so `007` and `1.50` stay strings.
pub fn coerce_scalar(raw: &str) -> JsonValue {
    match raw {
        "null" => return JsonValue::Null,
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        if i.to_string() == raw {
            return JsonValue::from(i);
        }
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() && f.to_string() == raw {
            return JsonValue::from(f);
        }
    }
    JsonValue::String(raw.to_string())
}

// ============================================================================
// Binding
// ============================================================================

/// Collects request inputs into a model
///
/// Later sources win: query parameters, then the body, then the path key.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    fields: JsonObject,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind non-reserved query parameters
    pub fn query(mut self, params: &StringMap) -> Self {
        let mut names: Vec<&String> = params
            .keys()
            .filter(|name| !RESERVED_PARAMS.contains(&name.as_str()))
            .collect();
        names.sort();
        for name in names {
            self.fields.insert(name.clone(), coerce_scalar(&params[name]));
        }
        self
    }

    /// Bind a JSON body; anything but an object is rejected
    pub fn body(mut self, body: JsonValue) -> Result<Self> {
        match body {
            JsonValue::Object(object) => {
                self.fields.extend(object);
                Ok(self)
            }
            JsonValue::Null => Ok(self),
            other => Err(Error::invalid_request(format!(
                "Request body must be a JSON object, got {other}"
            ))),
        }
    }

    /// Bind the path key into `column`
    pub fn key(mut self, column: &str, key: &str) -> Self {
        self.fields.insert(column.to_string(), coerce_scalar(key));
        self
    }

    /// Bound fields so far
    pub fn fields(&self) -> &JsonObject {
        &self.fields
    }

    /// Deserialize the bound fields into a model
    pub fn bind<M: Model>(self) -> Result<M> {
        serde_json::from_value(JsonValue::Object(self.fields))
            .map_err(|e| Error::invalid_request(format!("Failed to bind request: {e}")))
    }
}

//! Pagination types and traits
//!
//! Defines the query description handed to a data source and the two
//! capabilities the paginator needs from it.

use crate::error::Result;
use crate::types::SortDirection;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ============================================================================
// Field Specs
// ============================================================================

/// Ordered sort keys. The first entry is the primary sort key.
///
/// Insertion order is the sort precedence, so this is a list of pairs and
/// never a hash map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderSpec {
    keys: Vec<(String, SortDirection)>,
}

impl OrderSpec {
    /// Create an empty order spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ascending key
    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.push(field, SortDirection::Ascending);
        self
    }

    /// Append a descending key
    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.push(field, SortDirection::Descending);
        self
    }

    /// Append a key. A field that is already present keeps its position
    /// and takes the new direction.
    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        let field = field.into();
        if let Some(entry) = self.keys.iter_mut().find(|(name, _)| *name == field) {
            entry.1 = direction;
        } else {
            self.keys.push((field, direction));
        }
    }

    /// Iterate keys in precedence order
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.keys.iter().map(|(name, dir)| (name.as_str(), *dir))
    }

    /// Check if a field is one of the sort keys
    pub fn contains(&self, field: &str) -> bool {
        self.keys.iter().any(|(name, _)| name == field)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SortDirection)> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = (S, SortDirection)>>(iter: I) -> Self {
        let mut spec = Self::new();
        for (field, direction) in iter {
            spec.push(field, direction);
        }
        spec
    }
}

/// Ordered field projection with optional aliases. Empty selects every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectSpec {
    fields: Vec<(String, Option<String>)>,
}

impl SelectSpec {
    /// Create an empty (select all) spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.push(name, None);
        self
    }

    /// Add a field under an alias
    pub fn aliased(mut self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.push(name, Some(alias.into()));
        self
    }

    /// Add a field, replacing the alias if the field is already selected
    pub fn push(&mut self, name: impl Into<String>, alias: Option<String>) {
        let name = name.into();
        if let Some(entry) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            entry.1 = alias;
        } else {
            self.fields.push((name, alias));
        }
    }

    /// Iterate `(field, alias)` pairs in selection order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, alias)| (name.as_str(), alias.as_deref()))
    }

    /// Check if a field is selected under its own name
    pub fn contains_unaliased(&self, field: &str) -> bool {
        self.fields
            .iter()
            .any(|(name, alias)| name == field && alias.is_none())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// An empty spec means "select all fields"
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectSpec {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut spec = Self::new();
        for name in iter {
            spec.push(name, None);
        }
        spec
    }
}

// ============================================================================
// Page Query
// ============================================================================

/// One bounded query against a [`PageSource`]
///
/// Built with chained calls; the filter is borrowed and passed through
/// untouched.
#[derive(Debug)]
pub struct PageQuery<'a, F> {
    /// Projected fields (empty = all)
    pub select: SelectSpec,
    /// Opaque predicate
    pub filter: Option<&'a F>,
    /// Sort keys in precedence order
    pub order: OrderSpec,
    /// Maximum number of rows to return
    pub limit: usize,
}

impl<F> Default for PageQuery<'_, F> {
    fn default() -> Self {
        Self {
            select: SelectSpec::new(),
            filter: None,
            order: OrderSpec::new(),
            limit: 0,
        }
    }
}

impl<'a, F> PageQuery<'a, F> {
    /// Create an unbounded select-all query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the projection
    pub fn select(mut self, select: SelectSpec) -> Self {
        self.select = select;
        self
    }

    /// Set the predicate
    pub fn filter(mut self, filter: &'a F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append a sort key
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(field, direction);
        self
    }

    /// Set the row limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// A record with a designated unique, orderable key
///
/// The key's text form is what a cursor encodes.
pub trait Keyed {
    /// Text representation of the key attribute
    fn key(&self) -> String;
}

/// A queryable table that can run a [`PageQuery`]
pub trait PageSource {
    /// Predicate type understood by this source
    type Filter;

    /// Execution handle for one query
    type Handle<'a>: PageHandle
    where
        Self: 'a;

    /// Prepare a query for execution
    fn paginate(&self, query: PageQuery<'_, Self::Filter>) -> Result<Self::Handle<'_>>;
}

/// A prepared, cursor-capable query
pub trait PageHandle {
    /// Continue strictly after the record whose key encodes to `token`
    fn resume_from(&mut self, token: &[u8]) -> Result<()>;

    /// Execute and append every returned row to `into`
    fn decode_all<R: DeserializeOwned>(self, into: &mut Vec<R>) -> Result<()>;
}

// ============================================================================
// Results
// ============================================================================

/// Pagination metadata. Only non-default fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Meta {
    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.limit.is_none() && self.page.is_none()
    }
}

/// Response body for a list request: `{"meta": {...}, "result": [...]}`
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub meta: Meta,
    pub result: Vec<T>,
}

//! Cursor paginator
//!
//! Fetches one page of at most `limit` records and maintains the cursor that
//! resumes after it.

use super::cursor::{decode_cursor, encode_cursor};
use super::types::{Keyed, Meta, OrderSpec, PageHandle, PageQuery, PageSource, SelectSpec};
use crate::error::Result;
use serde::de::DeserializeOwned;

/// Keyset paginator for a single request
///
/// Created per request, used for exactly one [`fetch_page`](Self::fetch_page)
/// call, then discarded.
#[derive(Debug, Clone)]
pub struct Paginator<F> {
    /// Opaque position token; empty means "from the beginning"
    pub cursor: String,
    /// Page number, reported in metadata only
    pub page: u32,
    /// Page size
    pub limit: usize,
    /// Sort keys in precedence order
    pub order: OrderSpec,
    /// Projected fields (empty = all)
    pub select: SelectSpec,
    /// Opaque predicate, passed through to the source
    pub filter: Option<F>,
}

impl<F> Default for Paginator<F> {
    fn default() -> Self {
        Self {
            cursor: String::new(),
            page: 0,
            limit: 0,
            order: OrderSpec::new(),
            select: SelectSpec::new(),
            filter: None,
        }
    }
}

impl<F> Paginator<F> {
    /// Create a paginator with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the cursor to resume from
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Set the page number
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the sort keys
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order = order;
        self
    }

    /// Set the projection
    pub fn with_select(mut self, select: SelectSpec) -> Self {
        self.select = select;
        self
    }

    /// Set the predicate
    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Metadata for the response, containing only fields that are set
    pub fn build_meta(&self) -> Meta {
        Meta {
            cursor: (!self.cursor.is_empty()).then(|| self.cursor.clone()),
            limit: (self.limit != 0).then_some(self.limit),
            page: (self.page != 0).then_some(self.page),
        }
    }

    /// Fetch one page from `source` into `target`, replacing its contents.
    ///
    /// One extra row past `limit` is requested. When it arrives, the page is
    /// trimmed to `limit` and `self.cursor` is overwritten with the cursor of
    /// the last kept record; otherwise `self.cursor` is cleared because this
    /// was the last page.
    ///
    /// A malformed cursor fails before the source is queried. On any error
    /// `target` and `self.cursor` are left as they were.
    pub fn fetch_page<S, R>(&mut self, source: &S, target: &mut Vec<R>) -> Result<()>
    where
        S: PageSource<Filter = F>,
        R: Keyed + DeserializeOwned,
    {
        let token = decode_cursor(&self.cursor)?;

        let mut query = PageQuery::new()
            .limit(self.limit.saturating_add(1))
            .select(self.select.clone());
        if let Some(filter) = &self.filter {
            query = query.filter(filter);
        }
        for (field, direction) in self.order.iter() {
            query = query.order_by(field, direction);
        }

        tracing::debug!(
            limit = self.limit,
            resume = token.is_some(),
            order_keys = self.order.len(),
            "Fetching page"
        );

        let mut handle = source.paginate(query)?;
        if let Some(token) = &token {
            handle.resume_from(token)?;
        }

        let mut rows: Vec<R> = Vec::with_capacity(self.limit.saturating_add(1).min(1024));
        handle.decode_all(&mut rows)?;

        let next_cursor = if rows.len() > self.limit {
            // With limit 0 nothing is kept and the sentinel itself anchors the cursor
            let anchor = &rows[self.limit.saturating_sub(1)];
            let cursor = encode_cursor(&anchor.key());
            rows.truncate(self.limit);
            cursor
        } else {
            String::new()
        };

        tracing::debug!(
            returned = rows.len(),
            more = !next_cursor.is_empty(),
            "Page fetched"
        );

        *target = rows;
        self.cursor = next_cursor;
        Ok(())
    }
}

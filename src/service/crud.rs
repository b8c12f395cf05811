//! CRUD service over one table

use super::model::Model;
use super::query::{parse_select, FindQuery, GetQuery};
use crate::config::PaginationConfig;
use crate::database::{Database, Table};
use crate::error::{Error, Result};
use crate::pagination::{Page, Paginator};
use crate::types::JsonValue;
use std::marker::PhantomData;
use std::sync::Arc;

/// Create, read, update and delete records of model `M` stored in one table
///
/// All operations are blocking; async callers run them on a blocking thread.
pub struct CrudService<M> {
    db: Arc<Database>,
    table: String,
    bounds: PaginationConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for CrudService<M> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            table: self.table.clone(),
            bounds: self.bounds,
            _model: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for CrudService<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudService")
            .field("table", &self.table)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<M: Model> CrudService<M> {
    /// Serve `table` from `db`
    pub fn new(db: Arc<Database>, table: impl Into<String>, bounds: PaginationConfig) -> Self {
        Self {
            db,
            table: table.into(),
            bounds,
            _model: PhantomData,
        }
    }

    /// Table name
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Page size bounds used by [`find`](Self::find)
    pub fn bounds(&self) -> &PaginationConfig {
        &self.bounds
    }

    fn table(&self) -> Result<Table> {
        self.db.table(&self.table, M::KEY_COLUMN)
    }

    fn require_key(model: &M) -> Result<String> {
        let key = model.key();
        if key.is_empty() {
            return Err(Error::invalid_request(format!(
                "Missing '{}' field",
                M::KEY_COLUMN
            )));
        }
        Ok(key)
    }

    /// Insert a new record and return what was written
    pub fn create(&self, model: &M) -> Result<JsonValue> {
        let data = model.to_create()?;
        self.table()?.insert_one(&data)?;
        tracing::debug!(table = %self.table, key = %model.key(), "Created record");
        Ok(JsonValue::Object(data))
    }

    /// Update an existing record; fails with not found when no row matches
    pub fn update(&self, model: &M) -> Result<JsonValue> {
        let key = Self::require_key(model)?;
        let data = model.to_update()?;
        self.table()?.modify_one(&key, &data)?;
        Ok(JsonValue::Object(data))
    }

    /// Insert the record, or replace the row with the same key
    pub fn patch(&self, model: &M) -> Result<JsonValue> {
        Self::require_key(model)?;
        let data = model.to_update()?;
        self.table()?.upsert_one(&data)?;
        Ok(JsonValue::Object(data))
    }

    /// Delete a record; fails with not found when no row matches
    pub fn delete(&self, model: &M) -> Result<JsonValue> {
        let key = model.to_delete();
        if key.is_empty() {
            return Err(Error::invalid_request(format!(
                "Missing '{}' field",
                M::KEY_COLUMN
            )));
        }
        self.table()?.destroy_one(&key)?;
        tracing::debug!(table = %self.table, key = %key, "Deleted record");
        model.to_result()
    }

    /// Fetch the single record matching the model's query
    pub fn get(&self, model: &M, query: &GetQuery) -> Result<JsonValue> {
        let mut paginator = Paginator::new()
            .with_limit(1)
            .with_select(parse_select(&query.select))
            .with_filter(model.to_query()?);

        let mut records: Vec<M> = Vec::with_capacity(1);
        paginator.fetch_page(&self.table()?, &mut records)?;

        records
            .first()
            .ok_or_else(|| Error::not_found("entity not found"))?
            .to_result()
    }

    /// Fetch one page of records matching the model's query
    pub fn find(&self, model: &M, query: &FindQuery) -> Result<Page<JsonValue>> {
        let mut paginator = query.paginator(&self.bounds, model.to_query()?);

        let mut records: Vec<M> = Vec::new();
        paginator.fetch_page(&self.table()?, &mut records)?;

        Ok(Page {
            meta: paginator.build_meta(),
            result: records
                .iter()
                .map(Model::to_result)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

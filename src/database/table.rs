//! Queryable DuckDB table
//!
//! Implements [`PageSource`] with keyset continuation and the single-row
//! write operations used by the CRUD service.

use super::sql::{insert_columns, keyset_predicate, quote_identifier, Filter};
use super::value::{duckdb_to_json, json_to_duckdb};
use crate::error::{Error, Result};
use crate::pagination::{PageHandle, PageQuery, PageSource};
use crate::types::{JsonObject, JsonValue, SortDirection};
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use serde::de::DeserializeOwned;

/// A table bound to its key column
pub struct Table {
    conn: Connection,
    name: String,
    quoted_name: String,
    key_column: String,
    quoted_key: String,
}

impl Table {
    /// Bind `name` on `conn`, keyed by `key_column`
    pub fn new(conn: Connection, name: &str, key_column: &str) -> Result<Self> {
        Ok(Self {
            quoted_name: quote_identifier(name)?,
            quoted_key: quote_identifier(key_column)?,
            conn,
            name: name.to_string(),
            key_column: key_column.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Insert one row
    pub fn insert_one(&self, row: &JsonObject) -> Result<()> {
        self.write_row("INSERT", row)
    }

    /// Insert one row, replacing any row with the same primary key
    pub fn upsert_one(&self, row: &JsonObject) -> Result<()> {
        self.write_row("INSERT OR REPLACE", row)
    }

    fn write_row(&self, verb: &str, row: &JsonObject) -> Result<()> {
        if row.is_empty() {
            return Err(Error::invalid_request("Nothing to write: row is empty"));
        }

        let mut params = Vec::with_capacity(row.len());
        let (columns, placeholders) = insert_columns(row, &mut params)?;
        let sql = format!(
            "{verb} INTO {} ({columns}) VALUES ({placeholders})",
            self.quoted_name
        );

        tracing::debug!("Executing write: {}", sql);

        self.conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| Error::query(format!("Failed to write to '{}': {e}", self.name)))?;
        Ok(())
    }

    /// Update the row with key `key`. The key column itself is never updated.
    pub fn modify_one(&self, key: &str, row: &JsonObject) -> Result<()> {
        let mut assignments = Vec::with_capacity(row.len());
        let mut params = Vec::with_capacity(row.len() + 1);
        for (column, value) in row {
            if *column == self.key_column {
                continue;
            }
            assignments.push(format!("{} = ?", quote_identifier(column)?));
            params.push(json_to_duckdb(value));
        }
        if assignments.is_empty() {
            return Err(Error::invalid_request("Nothing to update: no columns given"));
        }
        params.push(Value::Text(key.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE CAST({} AS VARCHAR) = ?",
            self.quoted_name,
            assignments.join(", "),
            self.quoted_key
        );

        tracing::debug!("Executing update: {}", sql);

        let affected = self
            .conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(|e| Error::query(format!("Failed to update '{}': {e}", self.name)))?;
        if affected == 0 {
            return Err(Error::not_found("entity not found"));
        }
        Ok(())
    }

    /// Delete the row with key `key`
    pub fn destroy_one(&self, key: &str) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE CAST({} AS VARCHAR) = ?",
            self.quoted_name, self.quoted_key
        );

        tracing::debug!("Executing delete: {}", sql);

        let affected = self
            .conn
            .execute(&sql, [key])
            .map_err(|e| Error::query(format!("Failed to delete from '{}': {e}", self.name)))?;
        if affected == 0 {
            return Err(Error::not_found("entity not found"));
        }
        Ok(())
    }

    /// Projection list; the key column is always included so a cursor can be derived
    fn projection(&self, query: &PageQuery<'_, Filter>) -> Result<String> {
        if query.select.is_empty() {
            return Ok("*".to_string());
        }

        let mut columns = Vec::with_capacity(query.select.len() + 1);
        if !query.select.contains_unaliased(&self.key_column) {
            columns.push(self.quoted_key.clone());
        }
        for (field, alias) in query.select.iter() {
            let column = quote_identifier(field)?;
            match alias {
                Some(alias) => columns.push(format!("{column} AS {}", quote_identifier(alias)?)),
                None => columns.push(column),
            }
        }
        Ok(columns.join(", "))
    }
}

impl PageSource for Table {
    type Filter = Filter;
    type Handle<'a> = TablePage<'a>;

    fn paginate(&self, query: PageQuery<'_, Filter>) -> Result<TablePage<'_>> {
        let projection = self.projection(&query)?;

        let mut params = Vec::new();
        let mut conditions = Vec::new();
        if let Some(filter) = query.filter {
            if let Some(sql) = filter.to_sql(&mut params)? {
                conditions.push(sql);
            }
        }

        let mut order: Vec<(String, SortDirection)> = query
            .order
            .iter()
            .map(|(field, direction)| (field.to_string(), direction))
            .collect();
        if !query.order.contains(&self.key_column) {
            order.push((self.key_column.clone(), SortDirection::Ascending));
        }

        Ok(TablePage {
            table: self,
            projection,
            conditions,
            params,
            order,
            limit: query.limit,
        })
    }
}

/// One prepared page query on a [`Table`]
pub struct TablePage<'a> {
    table: &'a Table,
    projection: String,
    conditions: Vec<String>,
    params: Vec<Value>,
    order: Vec<(String, SortDirection)>,
    limit: usize,
}

impl TablePage<'_> {
    fn select_sql(&self) -> Result<String> {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.projection, self.table.quoted_name
        );

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }

        let order = self
            .order
            .iter()
            .map(|(column, direction)| {
                Ok(format!("{} {direction} NULLS LAST", quote_identifier(column)?))
            })
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));

        sql.push_str(&format!(" LIMIT {}", self.limit));
        Ok(sql)
    }
}

impl PageHandle for TablePage<'_> {
    fn resume_from(&mut self, token: &[u8]) -> Result<()> {
        let key = std::str::from_utf8(token)
            .map_err(|e| Error::decode(format!("Cursor is not valid UTF-8: {e}")))?;

        let columns = self
            .order
            .iter()
            .map(|(column, _)| quote_identifier(column))
            .collect::<Result<Vec<_>>>()?;
        let sql = format!(
            "SELECT {} FROM {} WHERE CAST({} AS VARCHAR) = ? LIMIT 1",
            columns.join(", "),
            self.table.quoted_name,
            self.table.quoted_key
        );

        tracing::debug!("Resolving cursor anchor: {}", sql);

        let anchor = match self.table.conn.query_row(&sql, [key], |row| {
            (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<duckdb::Result<Vec<Value>>>()
        }) {
            Ok(values) => values,
            Err(duckdb::Error::QueryReturnedNoRows) => {
                return Err(Error::CursorNotFound {
                    cursor: key.to_string(),
                })
            }
            Err(e) => return Err(Error::query(format!("Failed to resolve cursor: {e}"))),
        };

        let predicate = keyset_predicate(&self.order, &anchor, &mut self.params)?;
        self.conditions.push(predicate);
        Ok(())
    }

    fn decode_all<R: DeserializeOwned>(self, into: &mut Vec<R>) -> Result<()> {
        let sql = self.select_sql()?;

        tracing::debug!("Executing page query: {}", sql);

        let mut stmt = self
            .table
            .conn
            .prepare(&sql)
            .map_err(|e| Error::query(format!("Failed to prepare query: {e}")))?;
        let mut rows = stmt
            .query(params_from_iter(self.params.iter()))
            .map_err(|e| Error::query(format!("Failed to execute query: {e}")))?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(duckdb::Statement::column_names)
            .unwrap_or_default();

        while let Some(row) = rows
            .next()
            .map_err(|e| Error::query(format!("Failed to read row: {e}")))?
        {
            let mut record = JsonObject::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                let value: Value = row
                    .get(i)
                    .map_err(|e| Error::decode(format!("Column '{name}': {e}")))?;
                record.insert(name.clone(), duckdb_to_json(value));
            }
            let decoded = serde_json::from_value(JsonValue::Object(record))
                .map_err(|e| Error::decode(e.to_string()))?;
            into.push(decoded);
        }

        Ok(())
    }
}

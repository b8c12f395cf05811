//! CRUD service module
//!
//! Binds request inputs to a [`Model`] and runs create, get, find, update,
//! patch and delete against one database table. List requests go through the
//! cursor [`Paginator`](crate::pagination::Paginator) and answer with
//! `{"meta": {...}, "result": [...]}`.

mod crud;
mod model;
mod query;

pub use crud::CrudService;
pub use model::{key_text, to_object, Document, Model};
pub use query::{
    coerce_scalar, parse_order, parse_select, Binding, FindQuery, GetQuery, RESERVED_PARAMS,
};

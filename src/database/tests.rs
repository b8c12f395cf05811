//! Tests for database module

use super::*;
use crate::error::Error;
use crate::pagination::{
    encode_cursor, Keyed, OrderSpec, PageHandle, PageQuery, PageSource, Paginator, SelectSpec,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use test_case::test_case;

#[derive(Debug, Deserialize)]
struct User {
    key: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    age: Option<i64>,
}

impl Keyed for User {
    fn key(&self) -> String {
        self.key.to_string()
    }
}

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE users (key BIGINT PRIMARY KEY, name VARCHAR, age INTEGER);
         INSERT INTO users VALUES
           (1, 'ada', 36), (2, 'bob', 25), (3, 'cy', 36), (4, 'dee', 25), (5, 'eve', 41);",
    )
    .unwrap();
    db
}

fn page(db: &Database, paginator: &mut Paginator<Filter>) -> crate::Result<Vec<User>> {
    let table = db.table("users", "key")?;
    let mut users = Vec::new();
    paginator.fetch_page(&table, &mut users)?;
    Ok(users)
}

fn keys(users: &[User]) -> Vec<i64> {
    users.iter().map(|u| u.key).collect()
}

// ============================================================================
// Database Tests
// ============================================================================

#[test]
fn test_open_memory_aliases() {
    assert!(Database::open("").unwrap().is_in_memory());
    assert!(Database::open(MEMORY).unwrap().is_in_memory());
}

#[test]
fn test_check_and_list_tables() {
    let db = seeded();
    db.check_connection().unwrap();
    assert_eq!(db.list_tables().unwrap(), vec!["users".to_string()]);
}

#[test]
fn test_open_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.duckdb");
    let location = path.to_string_lossy().to_string();

    {
        let db = Database::open(&location).unwrap();
        db.execute_batch("CREATE TABLE notes (key VARCHAR PRIMARY KEY, body VARCHAR);")
            .unwrap();
    }

    let db = Database::open(&location).unwrap();
    assert_eq!(db.location(), location);
    assert_eq!(db.list_tables().unwrap(), vec!["notes".to_string()]);
}

#[test]
fn test_table_rejects_bad_identifiers() {
    let db = seeded();
    assert!(matches!(
        db.table("users; drop", "key"),
        Err(Error::InvalidIdentifier { .. })
    ));
}

// ============================================================================
// Page Query Tests
// ============================================================================

#[test]
fn test_walks_table_in_key_order() {
    let db = seeded();

    let mut first = Paginator::new().with_limit(2);
    assert_eq!(keys(&page(&db, &mut first).unwrap()), vec![1, 2]);
    assert_eq!(first.cursor, encode_cursor("2"));

    let mut second = Paginator::new().with_limit(2).with_cursor(first.cursor);
    assert_eq!(keys(&page(&db, &mut second).unwrap()), vec![3, 4]);
    assert_eq!(second.cursor, encode_cursor("4"));

    let mut third = Paginator::new().with_limit(2).with_cursor(second.cursor);
    assert_eq!(keys(&page(&db, &mut third).unwrap()), vec![5]);
    assert!(third.cursor.is_empty());
}

#[test]
fn test_multi_key_order_with_ties_resumes_exactly() {
    let db = seeded();
    let order = OrderSpec::new().desc("age").asc("name");
    let mut seen = Vec::new();
    let mut cursor = String::new();

    loop {
        let mut paginator = Paginator::new()
            .with_limit(2)
            .with_order(order.clone())
            .with_cursor(cursor);
        seen.extend(keys(&page(&db, &mut paginator).unwrap()));
        if paginator.cursor.is_empty() {
            break;
        }
        cursor = paginator.cursor;
    }

    assert_eq!(seen, vec![5, 1, 3, 2, 4]);
}

fn with_null_ages() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE users (key BIGINT PRIMARY KEY, name VARCHAR, age INTEGER);
         INSERT INTO users VALUES
           (1, 'ada', 30), (2, 'bob', NULL), (3, 'cy', 20), (4, 'dee', NULL), (5, 'eve', 40);",
    )
    .unwrap();
    db
}

#[test_case(OrderSpec::new().asc("age").asc("key"), 1, vec![3, 1, 5, 2, 4] ; "ascending one per page")]
#[test_case(OrderSpec::new().asc("age"), 2, vec![3, 1, 5, 2, 4] ; "ascending implicit key tie break")]
#[test_case(OrderSpec::new().desc("age"), 1, vec![5, 1, 3, 2, 4] ; "descending one per page")]
#[test_case(OrderSpec::new().desc("age").desc("key"), 3, vec![5, 1, 3, 4, 2] ; "descending key")]
fn test_null_sort_values_are_walked_last(order: OrderSpec, limit: usize, expected: Vec<i64>) {
    let db = with_null_ages();
    let mut seen = Vec::new();
    let mut cursor = String::new();

    loop {
        let mut paginator = Paginator::new()
            .with_limit(limit)
            .with_order(order.clone())
            .with_cursor(cursor);
        let users = page(&db, &mut paginator).unwrap();
        assert!(users.len() <= limit);
        seen.extend(keys(&users));
        if paginator.cursor.is_empty() {
            break;
        }
        cursor = paginator.cursor;
    }

    assert_eq!(seen, expected);
}

#[test]
fn test_filter_limits_rows() {
    let db = seeded();
    let mut paginator = Paginator::new()
        .with_limit(10)
        .with_filter(Filter::new().eq("age", 25));

    let users = page(&db, &mut paginator).unwrap();

    assert_eq!(keys(&users), vec![2, 4]);
    assert!(paginator.cursor.is_empty());
}

#[test]
fn test_filter_and_cursor_combine() {
    let db = seeded();
    let mut paginator = Paginator::new()
        .with_limit(1)
        .with_filter(Filter::new().eq("age", 36))
        .with_cursor(encode_cursor("1"));

    let users = page(&db, &mut paginator).unwrap();

    assert_eq!(keys(&users), vec![3]);
    assert!(paginator.cursor.is_empty());
}

#[test]
fn test_projection_always_carries_key() {
    let db = seeded();
    let mut paginator = Paginator::new()
        .with_limit(1)
        .with_select(SelectSpec::new().field("name"));

    let users = page(&db, &mut paginator).unwrap();

    assert_eq!(users[0].key, 1);
    assert_eq!(users[0].name.as_deref(), Some("ada"));
    assert!(users[0].age.is_none());
    assert_eq!(paginator.cursor, encode_cursor("1"));
}

#[test]
fn test_projection_alias() {
    let db = seeded();
    let table = db.table("users", "key").unwrap();
    let query = PageQuery::new()
        .limit(1)
        .select(SelectSpec::new().aliased("name", "age"));
    let mut rows: Vec<serde_json::Value> = Vec::new();

    let handle = table.paginate(query).unwrap();
    handle.decode_all(&mut rows).unwrap();

    assert_eq!(rows, vec![json!({"key": 1, "age": "ada"})]);
}

#[test]
fn test_unknown_cursor_key_is_rejected() {
    let db = seeded();
    let mut paginator = Paginator::new()
        .with_limit(2)
        .with_cursor(encode_cursor("999"));

    let err = page(&db, &mut paginator).unwrap_err();

    assert!(matches!(err, Error::CursorNotFound { ref cursor } if cursor == "999"));
}

#[test]
fn test_missing_table_is_query_error() {
    let db = Database::open_in_memory().unwrap();
    let mut paginator = Paginator::new().with_limit(2);

    let err = page(&db, &mut paginator).unwrap_err();

    assert!(matches!(err, Error::Query { .. }));
    assert!(paginator.cursor.is_empty());
}

// ============================================================================
// Write Tests
// ============================================================================

fn object(value: serde_json::Value) -> crate::types::JsonObject {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_insert_and_modify() {
    let db = seeded();
    let table = db.table("users", "key").unwrap();

    table
        .insert_one(&object(json!({"key": 6, "name": "fay", "age": 30})))
        .unwrap();
    table
        .modify_one("6", &object(json!({"key": 6, "age": 31})))
        .unwrap();

    let mut paginator = Paginator::new()
        .with_limit(1)
        .with_filter(Filter::new().eq("key", 6));
    let users = page(&db, &mut paginator).unwrap();
    assert_eq!(users[0].age, Some(31));
    assert_eq!(users[0].name.as_deref(), Some("fay"));
}

#[test]
fn test_insert_duplicate_key_fails() {
    let db = seeded();
    let table = db.table("users", "key").unwrap();

    let err = table
        .insert_one(&object(json!({"key": 1, "name": "dup"})))
        .unwrap_err();

    assert!(matches!(err, Error::Query { .. }));
}

#[test]
fn test_upsert_replaces_row() {
    let db = seeded();
    let table = db.table("users", "key").unwrap();

    table
        .upsert_one(&object(json!({"key": 1, "name": "ada2", "age": 37})))
        .unwrap();
    table
        .upsert_one(&object(json!({"key": 9, "name": "new", "age": 1})))
        .unwrap();

    let mut paginator = Paginator::new().with_limit(10);
    let users = page(&db, &mut paginator).unwrap();
    assert_eq!(keys(&users), vec![1, 2, 3, 4, 5, 9]);
    assert_eq!(users[0].name.as_deref(), Some("ada2"));
}

#[test]
fn test_modify_and_destroy_missing_rows() {
    let db = seeded();
    let table = db.table("users", "key").unwrap();

    assert!(matches!(
        table.modify_one("42", &object(json!({"age": 1}))),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(table.destroy_one("42"), Err(Error::NotFound { .. })));
    assert!(matches!(
        table.modify_one("1", &object(json!({"key": 1}))),
        Err(Error::InvalidRequest { .. })
    ));
}

#[test]
fn test_destroy_removes_row() {
    let db = seeded();
    let table = db.table("users", "key").unwrap();

    table.destroy_one("3").unwrap();

    let mut paginator = Paginator::new().with_limit(10);
    assert_eq!(keys(&page(&db, &mut paginator).unwrap()), vec![1, 2, 4, 5]);
}

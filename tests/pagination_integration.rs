//! Pagination integration tests against an in-memory DuckDB
//!
//! Walks real tables through the public API and checks that cursors resume
//! without skipping or repeating records.

use base64::Engine as _;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use tablecrud::database::{Database, Filter};
use tablecrud::pagination::{decode_cursor, OrderSpec, Paginator};
use tablecrud::{Error, Keyed};
use test_case::test_case;

#[derive(Debug, Deserialize)]
struct Row {
    key: String,
    score: i64,
}

impl Keyed for Row {
    fn key(&self) -> String {
        self.key.clone()
    }
}

/// Five rows keyed `1..5`, stored as text so keys round-trip unchanged
fn five_rows() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE rows (key VARCHAR PRIMARY KEY, score BIGINT);
         INSERT INTO rows VALUES ('1', 10), ('2', 20), ('3', 20), ('4', 30), ('5', 10);",
    )
    .unwrap();
    db
}

fn fetch(db: &Database, paginator: &mut Paginator<Filter>) -> tablecrud::Result<Vec<String>> {
    let table = db.table("rows", "key")?;
    let mut rows: Vec<Row> = Vec::new();
    paginator.fetch_page(&table, &mut rows)?;
    Ok(rows.into_iter().map(|r| r.key).collect())
}

fn decoded(cursor: &str) -> String {
    let bytes = decode_cursor(cursor).unwrap().unwrap();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_three_page_walk() {
    let db = five_rows();

    let mut first = Paginator::new().with_limit(2);
    assert_eq!(fetch(&db, &mut first).unwrap(), vec!["1", "2"]);
    assert_eq!(decoded(&first.cursor), "2");

    let mut second = Paginator::new().with_limit(2).with_cursor(first.cursor.clone());
    assert_eq!(fetch(&db, &mut second).unwrap(), vec!["3", "4"]);
    assert_eq!(decoded(&second.cursor), "4");

    let mut third = Paginator::new().with_limit(2).with_cursor(second.cursor.clone());
    assert_eq!(fetch(&db, &mut third).unwrap(), vec!["5"]);
    assert!(third.cursor.is_empty());
}

#[test]
fn test_large_limit_returns_everything() {
    let db = five_rows();
    let mut paginator = Paginator::new().with_limit(10);

    assert_eq!(
        fetch(&db, &mut paginator).unwrap(),
        vec!["1", "2", "3", "4", "5"]
    );
    assert!(paginator.cursor.is_empty());
    assert!(paginator.build_meta().cursor.is_none());
}

#[test]
fn test_malformed_cursor_is_rejected() {
    let db = five_rows();
    let mut paginator = Paginator::new()
        .with_limit(2)
        .with_cursor("not-valid-base64!!");

    let err = fetch(&db, &mut paginator).unwrap_err();

    assert!(matches!(err, Error::InvalidCursor(_)));
    assert_eq!(paginator.cursor, "not-valid-base64!!");
}

#[test]
fn test_cursor_is_standard_base64_of_key() {
    let db = five_rows();
    let mut paginator = Paginator::new().with_limit(1);

    fetch(&db, &mut paginator).unwrap();

    assert_eq!(
        paginator.cursor,
        base64::engine::general_purpose::STANDARD.encode("1")
    );
}

#[test_case(1 ; "page of one")]
#[test_case(2 ; "page of two")]
#[test_case(3 ; "page of three")]
#[test_case(5 ; "exact fit")]
fn test_sorted_walk_visits_every_row_once(limit: usize) {
    let db = five_rows();
    let order = OrderSpec::new().desc("score");
    let mut seen = Vec::new();
    let mut cursor = String::new();
    let mut pages = 0;

    loop {
        let mut paginator = Paginator::new()
            .with_limit(limit)
            .with_order(order.clone())
            .with_cursor(cursor);
        let keys = fetch(&db, &mut paginator).unwrap();
        assert!(keys.len() <= limit);
        seen.extend(keys);
        pages += 1;
        if paginator.cursor.is_empty() {
            break;
        }
        cursor = paginator.cursor;
    }

    assert_eq!(seen, vec!["4", "2", "3", "1", "5"]);
    assert_eq!(pages, 5_usize.div_ceil(limit));
}

#[test]
fn test_resume_after_anchor_row_is_deleted() {
    let db = five_rows();
    let mut first = Paginator::new().with_limit(2);
    fetch(&db, &mut first).unwrap();

    db.execute_batch("DELETE FROM rows WHERE key = '2'").unwrap();

    let mut second = Paginator::new().with_limit(2).with_cursor(first.cursor);
    let err = fetch(&db, &mut second).unwrap_err();
    assert!(matches!(err, Error::CursorNotFound { .. }));
}

#[test]
fn test_insert_before_cursor_does_not_shift_pages() {
    let db = five_rows();
    let mut first = Paginator::new().with_limit(2);
    fetch(&db, &mut first).unwrap();

    db.execute_batch("INSERT INTO rows VALUES ('0', 99)").unwrap();

    let mut second = Paginator::new().with_limit(2).with_cursor(first.cursor);
    assert_eq!(fetch(&db, &mut second).unwrap(), vec!["3", "4"]);
}

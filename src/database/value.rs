//! Conversions between DuckDB values and JSON

use crate::types::JsonValue;
use duckdb::types::{TimeUnit, Value};

/// Convert a JSON value into a bindable DuckDB value
pub fn json_to_duckdb(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                Value::UBigInt(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::Double)
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(value.to_string()),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Convert a DuckDB value to JSON
pub fn duckdb_to_json(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(b),
        Value::TinyInt(i) => JsonValue::Number(i.into()),
        Value::SmallInt(i) => JsonValue::Number(i.into()),
        Value::Int(i) => JsonValue::Number(i.into()),
        Value::BigInt(i) => JsonValue::Number(i.into()),
        Value::HugeInt(i) => JsonValue::String(i.to_string()),
        Value::UTinyInt(i) => JsonValue::Number(i.into()),
        Value::USmallInt(i) => JsonValue::Number(i.into()),
        Value::UInt(i) => JsonValue::Number(i.into()),
        Value::UBigInt(i) => JsonValue::Number(i.into()),
        Value::Float(f) => {
            serde_json::Number::from_f64(f64::from(f)).map_or(JsonValue::Null, JsonValue::Number)
        }
        Value::Double(f) => serde_json::Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(s) => JsonValue::String(s),
        Value::Blob(b) => JsonValue::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        Value::Timestamp(unit, i) => {
            let micros = to_micros(unit, i);
            let secs = micros.div_euclid(1_000_000);
            let nsecs = (micros.rem_euclid(1_000_000) * 1000) as u32;
            chrono::DateTime::from_timestamp(secs, nsecs)
                .map(|dt| JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()))
                .unwrap_or(JsonValue::Number(i.into()))
        }
        Value::Date32(d) => {
            // 719163 days from 0001-01-01 to 1970-01-01
            chrono::NaiveDate::from_num_days_from_ce_opt(d + 719_163)
                .map(|date| JsonValue::String(date.format("%Y-%m-%d").to_string()))
                .unwrap_or(JsonValue::Number(d.into()))
        }
        Value::Time64(unit, t) => {
            let micros = to_micros(unit, t);
            let secs = micros / 1_000_000;
            JsonValue::String(format!(
                "{:02}:{:02}:{:02}.{:06}",
                secs / 3600,
                (secs % 3600) / 60,
                secs % 60,
                micros % 1_000_000
            ))
        }
        Value::Enum(s) => JsonValue::String(s),
        Value::List(items) => {
            JsonValue::Array(items.into_iter().map(duckdb_to_json).collect())
        }
        other => JsonValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duckdb_to_json_scalars() {
        assert_eq!(duckdb_to_json(Value::Null), JsonValue::Null);
        assert_eq!(duckdb_to_json(Value::Boolean(true)), json!(true));
        assert_eq!(duckdb_to_json(Value::Int(42)), json!(42));
        assert_eq!(duckdb_to_json(Value::Text("hello".to_string())), json!("hello"));
        assert_eq!(duckdb_to_json(Value::HugeInt(7)), json!("7"));
    }

    #[test]
    fn test_duckdb_to_json_temporal() {
        assert_eq!(duckdb_to_json(Value::Date32(0)), json!("1970-01-01"));
        assert_eq!(
            duckdb_to_json(Value::Timestamp(TimeUnit::Second, 86_400)),
            json!("1970-01-02T00:00:00.000000Z")
        );
    }

    #[test]
    fn test_json_to_duckdb() {
        assert_eq!(json_to_duckdb(&json!(null)), Value::Null);
        assert_eq!(json_to_duckdb(&json!(5)), Value::BigInt(5));
        assert_eq!(json_to_duckdb(&json!(u64::MAX)), Value::UBigInt(u64::MAX));
        assert_eq!(json_to_duckdb(&json!(1.5)), Value::Double(1.5));
        assert_eq!(json_to_duckdb(&json!("x")), Value::Text("x".to_string()));
        assert_eq!(
            json_to_duckdb(&json!({"a": 1})),
            Value::Text("{\"a\":1}".to_string())
        );
    }
}

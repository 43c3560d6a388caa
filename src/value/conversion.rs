use crate::query::QueryError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_query::{Value, ValueType};
use serde_json::{Number, Value as Json};
use std::str::FromStr;

/// Format `NaiveDateTime` uses when serialized, so scanned timestamps and
/// model fields compare equal as JSON.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// SQL type of a model column.
///
/// JSON alone cannot type every column: a timestamp serializes as a string
/// and a `BIGINT` key may hold a small number. Models that declare their
/// column types bind values as exactly these types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    /// `INTEGER` / `SERIAL`
    Int,
    /// `BIGINT` / `BIGSERIAL`
    BigInt,
    /// `DOUBLE PRECISION`
    Double,
    Numeric,
    Text,
    /// `TIMESTAMP` without time zone
    Timestamp,
}

pub(crate) fn as_timestamp(value: &Value) -> Option<NaiveDateTime> {
    <NaiveDateTime as ValueType>::try_from(value.clone()).ok()
}

pub(crate) fn as_decimal(value: &Value) -> Option<Decimal> {
    <Decimal as ValueType>::try_from(value.clone()).ok()
}

/// Record form of a timestamp.
pub fn timestamp_to_json(ts: NaiveDateTime) -> Json {
    Json::String(ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Record form of a decimal: its exact text, scale included.
pub fn decimal_to_json(d: Decimal) -> Json {
    Json::String(d.to_string())
}

/// Render a bound value as an SQL literal.
///
/// Used for the inlined form of a statement that `.debug()` logs. Strings are
/// single-quoted with embedded quotes doubled; nulls render as `NULL`.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Bool(Some(b)) => b.to_string(),
        Value::TinyInt(Some(i)) => i.to_string(),
        Value::SmallInt(Some(i)) => i.to_string(),
        Value::Int(Some(i)) => i.to_string(),
        Value::BigInt(Some(i)) => i.to_string(),
        Value::TinyUnsigned(Some(u)) => u.to_string(),
        Value::SmallUnsigned(Some(u)) => u.to_string(),
        Value::Unsigned(Some(u)) => u.to_string(),
        Value::BigUnsigned(Some(u)) => u.to_string(),
        Value::Float(Some(f)) => f.to_string(),
        Value::Double(Some(d)) => d.to_string(),
        Value::String(Some(s)) => quote(s),
        Value::Json(Some(j)) => quote(&j.to_string()),
        Value::ChronoDateTime(_) => {
            as_timestamp(value).map_or_else(|| "NULL".to_string(), |ts| quote(&ts.to_string()))
        }
        Value::Decimal(_) => as_decimal(value).map_or_else(|| "NULL".to_string(), |d| d.to_string()),
        Value::Bytes(Some(b)) => {
            let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
            format!("'\\x{hex}'")
        }
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Json(None)
        | Value::Bytes(None) => "NULL".to_string(),
        other => quote(&format!("{other:?}")),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Convert a bound value into the JSON form records use.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(Some(b)) => Json::Bool(*b),
        Value::TinyInt(Some(i)) => Json::from(*i),
        Value::SmallInt(Some(i)) => Json::from(*i),
        Value::Int(Some(i)) => Json::from(*i),
        Value::BigInt(Some(i)) => Json::from(*i),
        Value::TinyUnsigned(Some(u)) => Json::from(*u),
        Value::SmallUnsigned(Some(u)) => Json::from(*u),
        Value::Unsigned(Some(u)) => Json::from(*u),
        Value::BigUnsigned(Some(u)) => Json::from(*u),
        Value::Float(Some(f)) => float_to_json(f64::from(*f)),
        Value::Double(Some(d)) => float_to_json(*d),
        Value::String(Some(s)) => Json::String(s.to_string()),
        Value::Json(Some(j)) => Json::clone(j),
        Value::ChronoDateTime(_) => as_timestamp(value).map_or(Json::Null, timestamp_to_json),
        Value::Decimal(_) => as_decimal(value).map_or(Json::Null, decimal_to_json),
        Value::Bytes(Some(b)) => Json::Array(b.iter().map(|byte| Json::from(*byte)).collect()),
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Json(None)
        | Value::Bytes(None) => Json::Null,
        other => {
            log::warn!("no JSON mapping for bound value {other:?}, storing its debug form");
            Json::String(format!("{other:?}"))
        }
    }
}

fn float_to_json(f: f64) -> Json {
    Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)
}

/// Convert a record value into a bound value.
///
/// Integers that fit in 32 bits bind as `Int` so they compare against
/// `INTEGER` columns without a cast; wider ones bind as `BigInt`.
pub fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::String(None),
        Json::Bool(b) => Value::from(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(small) => Value::from(small),
                    Err(_) => Value::from(i),
                }
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::from(s.clone()),
        Json::Array(_) | Json::Object(_) => Value::from(json.clone()),
    }
}

/// Convert a record value into a bound value of the column's type.
///
/// # Errors
///
/// Returns `QueryError::InvalidValue` when `json` cannot be read as `ty`.
pub fn typed_value(column: &str, json: &Json, ty: ColumnType) -> Result<Value, QueryError> {
    let invalid = || QueryError::InvalidValue {
        column: column.to_string(),
        expected: ty,
        found: json.to_string(),
    };
    let value = match (ty, json) {
        (ColumnType::Bool, Json::Null) => Value::Bool(None),
        (ColumnType::Bool, Json::Bool(b)) => Value::from(*b),
        (ColumnType::Int, Json::Null) => Value::Int(None),
        (ColumnType::Int, Json::Number(n)) => {
            let i = n.as_i64().and_then(|i| i32::try_from(i).ok()).ok_or_else(invalid)?;
            Value::from(i)
        }
        (ColumnType::BigInt, Json::Null) => Value::BigInt(None),
        (ColumnType::BigInt, Json::Number(n)) => Value::from(n.as_i64().ok_or_else(invalid)?),
        (ColumnType::Double, Json::Null) => Value::Double(None),
        (ColumnType::Double, Json::Number(n)) => Value::from(n.as_f64().ok_or_else(invalid)?),
        (ColumnType::Numeric, Json::Null) => Value::from(None::<Decimal>),
        (ColumnType::Numeric, Json::Number(n)) => {
            Value::from(Decimal::from_str(&n.to_string()).map_err(|_| invalid())?)
        }
        (ColumnType::Numeric, Json::String(s)) => {
            Value::from(Decimal::from_str(s).map_err(|_| invalid())?)
        }
        (ColumnType::Text, Json::Null) => Value::String(None),
        (ColumnType::Text, Json::String(s)) => Value::from(s.clone()),
        (ColumnType::Timestamp, Json::Null) => Value::from(None::<NaiveDateTime>),
        (ColumnType::Timestamp, Json::String(s)) => {
            Value::from(s.parse::<NaiveDateTime>().map_err(|_| invalid())?)
        }
        _ => return Err(invalid()),
    };
    Ok(value)
}

/// Whether a record value is the zero value of its type.
///
/// Zero-valued fields of a model never become query conditions or
/// initialization attributes.
pub fn is_zero(json: &Json) -> bool {
    match json {
        Json::Null => true,
        Json::Bool(b) => !b,
        Json::Number(n) => n.as_f64() == Some(0.0),
        Json::String(s) => s.is_empty(),
        Json::Array(items) => items.is_empty(),
        Json::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sql_literal_scalars() {
        assert_eq!(sql_literal(&Value::from(18)), "18");
        assert_eq!(sql_literal(&Value::from(true)), "true");
        assert_eq!(sql_literal(&Value::from("w1")), "'w1'");
        assert_eq!(sql_literal(&Value::from(2.5f64)), "2.5");
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(sql_literal(&Value::from("O'Brien")), "'O''Brien'");
    }

    #[test]
    fn test_sql_literal_null() {
        assert_eq!(sql_literal(&Value::String(None)), "NULL");
        assert_eq!(sql_literal(&Value::Int(None)), "NULL");
    }

    #[test]
    fn test_json_to_value_prefers_i32() {
        assert_eq!(json_to_value(&json!(20)), Value::from(20i32));
        assert_eq!(json_to_value(&json!(5_000_000_000i64)), Value::from(5_000_000_000i64));
    }

    #[test]
    fn test_json_value_round_trip_for_text() {
        let value = json_to_value(&json!("shanghai"));
        assert_eq!(value_to_json(&value), json!("shanghai"));
    }

    fn ts() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-01 08:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_timestamp_json_matches_serde() {
        assert_eq!(timestamp_to_json(ts()), serde_json::to_value(ts()).unwrap());
    }

    #[test]
    fn test_typed_timestamp_binds_as_datetime() {
        let value = typed_value("CreateTime", &timestamp_to_json(ts()), ColumnType::Timestamp).unwrap();
        assert_eq!(value, Value::from(ts()));
        assert_eq!(sql_literal(&value), "'2024-01-01 08:30:00'");
        assert_eq!(value_to_json(&value), json!("2024-01-01T08:30:00"));

        let null = typed_value("CreateTime", &json!(null), ColumnType::Timestamp).unwrap();
        assert!(matches!(null, Value::ChronoDateTime(_)));
        assert_eq!(sql_literal(&null), "NULL");
    }

    #[test]
    fn test_typed_integers_follow_the_column() {
        assert_eq!(typed_value("Id", &json!(7), ColumnType::BigInt).unwrap(), Value::from(7i64));
        assert_eq!(typed_value("Age", &json!(7), ColumnType::Int).unwrap(), Value::from(7i32));
        assert!(matches!(
            typed_value("Age", &json!(5_000_000_000i64), ColumnType::Int),
            Err(QueryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_typed_numeric_keeps_scale() {
        let value = typed_value("Price", &json!("19.50"), ColumnType::Numeric).unwrap();
        assert_eq!(sql_literal(&value), "19.50");
        assert_eq!(value_to_json(&value), json!("19.50"));
        assert_eq!(
            typed_value("Price", &json!(2.5), ColumnType::Numeric).unwrap(),
            Value::from(Decimal::new(25, 1))
        );
    }

    #[test]
    fn test_typed_value_rejects_mismatched_json() {
        let err = typed_value("CreateTime", &json!("yesterday"), ColumnType::Timestamp).unwrap_err();
        assert!(err.to_string().contains("CreateTime"));
        assert!(typed_value("Name", &json!(3), ColumnType::Text).is_err());
    }

    #[test]
    fn test_is_zero() {
        assert!(is_zero(&json!(null)));
        assert!(is_zero(&json!(0)));
        assert!(is_zero(&json!(0.0)));
        assert!(is_zero(&json!("")));
        assert!(is_zero(&json!(false)));
        assert!(!is_zero(&json!(20)));
        assert!(!is_zero(&json!("w7")));
    }
}

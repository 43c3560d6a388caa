//! Bound value conversion for `may_postgres`.
//!
//! Each value is boxed as an owned `ToSql` first, then borrowed, so every
//! reference stays valid for the closure's duration. Nulls keep the type of
//! their variant: the driver checks a parameter's Rust type against the
//! column type even when the value is `None`.

use super::conversion::{as_decimal, as_timestamp};
use crate::executor::DbError;
use may_postgres::types::ToSql;
use sea_query::Value;

fn to_owned_param(value: &Value) -> Result<Box<dyn ToSql>, DbError> {
    let param: Box<dyn ToSql> = match value {
        Value::Bool(b) => Box::new(*b),
        Value::TinyInt(i) => Box::new(i.map(i32::from)),
        Value::SmallInt(i) => Box::new(i.map(i32::from)),
        Value::Int(i) => Box::new(*i),
        Value::BigInt(i) => Box::new(*i),
        Value::TinyUnsigned(u) => Box::new(u.map(i32::from)),
        Value::SmallUnsigned(u) => Box::new(u.map(i32::from)),
        Value::Unsigned(u) => Box::new(u.map(i64::from)),
        Value::BigUnsigned(Some(u)) => {
            let signed = i64::try_from(*u).map_err(|_| {
                DbError::Other(format!(
                    "BigUnsigned value {u} exceeds i64::MAX and cannot be bound"
                ))
            })?;
            Box::new(Some(signed))
        }
        Value::BigUnsigned(None) => Box::new(None::<i64>),
        Value::Float(f) => Box::new(*f),
        Value::Double(d) => Box::new(*d),
        Value::String(s) => Box::new(s.as_ref().map(|s| s.to_string())),
        Value::Json(j) => Box::new(j.as_ref().map(|j| j.to_string())),
        Value::Bytes(b) => Box::new(b.clone()),
        Value::ChronoDateTime(_) => Box::new(as_timestamp(value)),
        Value::Decimal(_) => Box::new(as_decimal(value)),
        other => {
            return Err(DbError::Other(format!(
                "Unsupported value type in query: {other:?}"
            )));
        }
    };
    Ok(param)
}

/// Convert bound values into driver parameters and run `f` with them.
///
/// # Errors
///
/// Returns `DbError::Other` for value types the driver cannot bind here,
/// or for unsigned values that do not fit in `i64`.
pub(crate) fn with_converted_params<F, R>(values: &[Value], f: F) -> Result<R, DbError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, DbError>,
{
    let owned = values
        .iter()
        .map(to_owned_param)
        .collect::<Result<Vec<_>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|param| param.as_ref()).collect();
    f(&params)
}

//! Values bound into statements and the records rows are scanned into.
//!
//! Bound parameters are `sea_query::Value`s. Rows come back as [`Record`]s,
//! an ordered map from column name to JSON value, which `serde` turns into
//! models. The helpers here move values between those two worlds and render
//! them as SQL literals for debug output.

mod conversion;
mod params;

pub(crate) use conversion::{as_decimal, as_timestamp};
pub use conversion::{
    decimal_to_json, is_zero, json_to_value, sql_literal, timestamp_to_json, typed_value,
    value_to_json, ColumnType,
};
pub(crate) use params::with_converted_params;

pub use sea_query::Value;

/// A scanned row: column name to value.
pub type Record = serde_json::Map<String, serde_json::Value>;

//! Models: structs mapped onto a table through `serde`.
//!
//! A model serializes to a [`Record`] whose keys are its column names, so
//! `#[serde(rename_all = "...")]` decides the column spelling. Models should
//! carry `#[serde(default)]` so partial rows (projections, initialized
//! records) deserialize with the remaining fields at their zero value.

use crate::executor::{DbError, Executor};
use crate::query::{QueryError, Select};
use crate::value::{is_zero, json_to_value, typed_value, ColumnType, Record, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as Json;

/// A struct stored in one table.
///
/// # Example
///
/// ```
/// use primer::model::Model;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// #[serde(default, rename_all = "PascalCase")]
/// struct Pet {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for Pet {
///     const TABLE: &'static str = "Pet";
///     const PRIMARY_KEY: &'static str = "Id";
///     const COLUMNS: &'static [&'static str] = &["Id", "Name"];
/// }
///
/// let stmt = Pet::find().build().unwrap();
/// assert_eq!(stmt.sql, r#"SELECT * FROM "Pet""#);
/// ```
pub trait Model: Serialize + DeserializeOwned + Default {
    /// Table name, unquoted
    const TABLE: &'static str;
    /// Primary key column, used to order `first`
    const PRIMARY_KEY: &'static str;
    /// Every column, in declaration order
    const COLUMNS: &'static [&'static str];

    /// SQL type of `column`, when the model declares it.
    ///
    /// Undeclared columns bind by the shape of their JSON value, which is
    /// wrong for timestamps (bound as text) and `BIGINT` columns holding
    /// small numbers (bound as `INTEGER`).
    fn column_type(_column: &str) -> Option<ColumnType> {
        None
    }

    /// Bind a record value for one of this model's columns.
    fn bind_value(column: &str, json: &Json) -> Result<Value, QueryError> {
        let column = Self::resolve_column(column);
        match Self::column_type(&column) {
            Some(ty) => typed_value(&column, json, ty),
            None => Ok(json_to_value(json)),
        }
    }

    /// Start a query over this model's table.
    fn find() -> Select {
        Select::from_model::<Self>()
    }

    /// Serialize into a record keyed by column name.
    fn to_record(&self) -> Result<Record, QueryError> {
        match serde_json::to_value(self) {
            Ok(Json::Object(map)) => Ok(map),
            Ok(other) => Err(QueryError::Serialization(format!(
                "{} serialized to {other}, expected an object",
                Self::TABLE
            ))),
            Err(e) => Err(QueryError::Serialization(e.to_string())),
        }
    }

    /// The fields that are not at their zero value.
    fn non_zero_fields(&self) -> Result<Record, QueryError> {
        let mut record = self.to_record()?;
        record.retain(|_, value| !is_zero(value));
        Ok(record)
    }

    /// Deserialize from a scanned row. Unknown columns are ignored.
    fn from_record(record: &Record) -> Result<Self, DbError> {
        serde_json::from_value(Json::Object(record.clone())).map_err(|e| {
            DbError::ParseError(format!("Failed to parse {} row: {e}", Self::TABLE))
        })
    }

    /// Insert the non-zero fields as a new row and return the stored row.
    ///
    /// Zero-valued fields are left to the column defaults, so a zero primary
    /// key is assigned by the database.
    fn insert<Ex>(&self, executor: &Ex) -> Result<Self, DbError>
    where
        Ex: Executor + ?Sized,
    {
        let statement = crate::query::insert_statement::<Self>(&self.non_zero_fields()?)?;
        match executor.query_all(&statement)?.first() {
            Some(row) => Self::from_record(row),
            None => Self::from_record(&self.to_record()?),
        }
    }

    /// Map a caller-supplied key onto this model's column spelling.
    ///
    /// Matching is case-insensitive, so `"name"` resolves to `"Name"`.
    /// Unknown keys are returned unchanged.
    fn resolve_column(key: &str) -> String {
        Self::COLUMNS
            .iter()
            .find(|column| column.eq_ignore_ascii_case(key))
            .map_or_else(|| key.to_string(), |column| (*column).to_string())
    }
}

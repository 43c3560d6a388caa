//! Executor seam between built statements and the database.
//!
//! The [`Executor`] trait lets lessons and the query layer run the same code
//! against a live `may_postgres` connection or against the
//! [`MockExecutor`](crate::mock::MockExecutor) used by tests and dry runs.

use crate::query::{QueryError, Statement};
use crate::value::{decimal_to_json, timestamp_to_json, with_converted_params, Record};
use may_postgres::types::{FromSql, Type};
use rust_decimal::Decimal;
use may_postgres::{Client, Error as PostgresError, Row};
use serde_json::Value as Json;
use std::fmt;
use std::time::Instant;

#[cfg(feature = "tracing")]
use crate::telemetry::tracing_helpers;

/// Database execution error
#[derive(Debug)]
pub enum DbError {
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// The statement could not be built
    Query(QueryError),
    /// Row parsing/conversion error
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            DbError::Query(e) => write!(f, "Query error: {e}"),
            DbError::ParseError(s) => write!(f, "Parse error: {s}"),
            DbError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::PostgresError(e) => Some(e),
            DbError::Query(e) => Some(e),
            DbError::ParseError(_) | DbError::Other(_) => None,
        }
    }
}

impl From<PostgresError> for DbError {
    fn from(err: PostgresError) -> Self {
        DbError::PostgresError(err)
    }
}

impl From<QueryError> for DbError {
    fn from(err: QueryError) -> Self {
        DbError::Query(err)
    }
}

/// Runs built statements.
///
/// Implementations return rows as [`Record`]s so callers never touch a
/// driver-specific row type.
pub trait Executor {
    /// Run a query and return every row it produced.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the statement fails or a row cannot be scanned.
    fn query_all(&self, statement: &Statement) -> Result<Vec<Record>, DbError>;

    /// Run a statement and return the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the statement fails.
    fn execute(&self, statement: &Statement) -> Result<u64, DbError>;
}

impl<T: Executor + ?Sized> Executor for Box<T> {
    fn query_all(&self, statement: &Statement) -> Result<Vec<Record>, DbError> {
        (**self).query_all(statement)
    }

    fn execute(&self, statement: &Statement) -> Result<u64, DbError> {
        (**self).execute(statement)
    }
}

/// Run `f` inside a transaction that is rolled back whether or not it
/// succeeds, so its writes are visible to `f` but never persist.
///
/// The executor must keep one connection for the whole call, as
/// [`PostgresExecutor`] does.
///
/// # Errors
///
/// Returns the error from `f`, or from `BEGIN`/`ROLLBACK` when `f` succeeded.
pub fn rolled_back<Ex, T, F>(executor: &Ex, f: F) -> Result<T, DbError>
where
    Ex: Executor + ?Sized,
    F: FnOnce(&Ex) -> Result<T, DbError>,
{
    executor.execute(&Statement::from_sql("BEGIN", Vec::new()))?;
    let result = f(executor);
    let rollback = executor.execute(&Statement::from_sql("ROLLBACK", Vec::new()));
    match (result, rollback) {
        (Ok(value), Ok(_)) => Ok(value),
        (Ok(_), Err(e)) | (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(rollback_err)) => {
            log::warn!("ROLLBACK failed after an error: {rollback_err}");
            Err(e)
        }
    }
}

/// [`Executor`] backed by a `may_postgres::Client`.
pub struct PostgresExecutor {
    client: Client,
}

impl PostgresExecutor {
    /// Create a new executor from a `may_postgres::Client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Consume the executor and return the underlying client
    pub fn into_client(self) -> Client {
        self.client
    }
}

impl Executor for PostgresExecutor {
    fn query_all(&self, statement: &Statement) -> Result<Vec<Record>, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(&statement.sql).entered();

        let start = Instant::now();
        let rows = with_converted_params(&statement.values, |params| {
            Ok(self.client.query(statement.sql.as_str(), params)?)
        })?;
        log::debug!("query returned {} row(s) in {:?}", rows.len(), start.elapsed());

        rows.iter().map(row_to_record).collect()
    }

    fn execute(&self, statement: &Statement) -> Result<u64, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(&statement.sql).entered();

        let start = Instant::now();
        let affected = with_converted_params(&statement.values, |params| {
            Ok(self.client.execute(statement.sql.as_str(), params)?)
        })?;
        log::debug!("statement affected {affected} row(s) in {:?}", start.elapsed());
        Ok(affected)
    }
}

fn get<T>(row: &Row, idx: usize) -> Result<Option<T>, DbError>
where
    T: for<'a> FromSql<'a>,
{
    row.try_get::<usize, Option<T>>(idx)
        .map_err(|e| DbError::ParseError(format!("Failed to read column {idx}: {e}")))
}

fn to_json<T: serde::Serialize>(value: Option<T>) -> Result<Json, DbError> {
    match value {
        Some(v) => serde_json::to_value(v)
            .map_err(|e| DbError::ParseError(format!("Failed to convert column value: {e}"))),
        None => Ok(Json::Null),
    }
}

/// Rust type a column is read as before it becomes a record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoder {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    /// `NUMERIC`, which is also what `AVG` and `SUM` over integers return
    Numeric,
    Timestamp,
    TimestampTz,
    Date,
    Text,
    /// Read as text if the driver allows it, else `NULL` with a warning
    Other,
}

fn decoder_for(ty: &Type) -> Decoder {
    if *ty == Type::BOOL {
        Decoder::Bool
    } else if *ty == Type::INT2 {
        Decoder::Int2
    } else if *ty == Type::INT4 {
        Decoder::Int4
    } else if *ty == Type::INT8 {
        Decoder::Int8
    } else if *ty == Type::FLOAT4 {
        Decoder::Float4
    } else if *ty == Type::FLOAT8 {
        Decoder::Float8
    } else if *ty == Type::NUMERIC {
        Decoder::Numeric
    } else if *ty == Type::TIMESTAMP {
        Decoder::Timestamp
    } else if *ty == Type::TIMESTAMPTZ {
        Decoder::TimestampTz
    } else if *ty == Type::DATE {
        Decoder::Date
    } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
        Decoder::Text
    } else {
        Decoder::Other
    }
}

/// Scan a driver row into a [`Record`], choosing the Rust type by column type.
fn row_to_record(row: &Row) -> Result<Record, DbError> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = match decoder_for(column.type_()) {
            Decoder::Bool => to_json(get::<bool>(row, idx)?)?,
            Decoder::Int2 => to_json(get::<i16>(row, idx)?)?,
            Decoder::Int4 => to_json(get::<i32>(row, idx)?)?,
            Decoder::Int8 => to_json(get::<i64>(row, idx)?)?,
            Decoder::Float4 => to_json(get::<f32>(row, idx)?)?,
            Decoder::Float8 => to_json(get::<f64>(row, idx)?)?,
            Decoder::Numeric => get::<Decimal>(row, idx)?.map_or(Json::Null, decimal_to_json),
            Decoder::Timestamp => {
                get::<chrono::NaiveDateTime>(row, idx)?.map_or(Json::Null, timestamp_to_json)
            }
            Decoder::TimestampTz => to_json(get::<chrono::DateTime<chrono::Utc>>(row, idx)?)?,
            Decoder::Date => to_json(get::<chrono::NaiveDate>(row, idx)?)?,
            Decoder::Text => to_json(get::<String>(row, idx)?)?,
            Decoder::Other => match get::<String>(row, idx) {
                Ok(text) => to_json(text)?,
                Err(_) => {
                    log::warn!(
                        "column {} has unsupported type {}, scanned as NULL",
                        column.name(),
                        column.type_()
                    );
                    Json::Null
                }
            },
        };
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

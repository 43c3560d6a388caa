//! Errors raised while building a statement.

use crate::value::ColumnType;
use std::fmt;

/// A statement could not be built from its clauses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A `?` placeholder had no argument left to bind
    MissingArgument { sql: String, position: usize },
    /// More arguments were supplied than the fragment has placeholders
    UnusedArguments {
        sql: String,
        placeholders: usize,
        supplied: usize,
    },
    /// An `@name` placeholder had no matching named argument
    UnknownNamedArgument { sql: String, name: String },
    /// A `SELECT` was built without a table or model
    MissingTable,
    /// A model could not be converted to or from a record
    Serialization(String),
    /// A record value does not fit its column's declared type
    InvalidValue {
        column: String,
        expected: ColumnType,
        found: String,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::MissingArgument { sql, position } => {
                write!(f, "placeholder {position} in `{sql}` has no argument")
            }
            QueryError::UnusedArguments {
                sql,
                placeholders,
                supplied,
            } => write!(
                f,
                "`{sql}` has {placeholders} placeholder(s) but {supplied} argument(s) were supplied"
            ),
            QueryError::UnknownNamedArgument { sql, name } => {
                write!(f, "named argument @{name} used in `{sql}` was not supplied")
            }
            QueryError::MissingTable => write!(f, "SELECT has no table or model"),
            QueryError::Serialization(msg) => write!(f, "model conversion failed: {msg}"),
            QueryError::InvalidValue {
                column,
                expected,
                found,
            } => write!(f, "column {column} expects {expected:?}, got {found}"),
        }
    }
}

impl std::error::Error for QueryError {}

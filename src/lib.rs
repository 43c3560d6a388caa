//! # Primer
//!
//! Short, runnable lessons: functions and closures, arrays, enumerations,
//! float precision, a wait group over `may` coroutines, and a gorm-style
//! query layer over `may_postgres`.
//!
//! The query layer lives in [`query`]; [`executor`] runs its statements
//! against PostgreSQL and [`mock`] against queued in-memory results.

pub mod config;
pub mod connection;
pub mod executor;
pub mod lessons;
pub mod mock;
pub mod model;
pub mod query;
pub mod telemetry;
pub mod value;

pub use config::DatabaseConfig;
pub use executor::{DbError, Executor, PostgresExecutor};
pub use mock::MockExecutor;
pub use model::Model;
pub use query::{Condition, QueryError, Select, Statement};
pub use value::Record;

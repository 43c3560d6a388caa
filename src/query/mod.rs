//! Query building and execution.
//!
//! Queries are written the way the object-mapping lessons describe them:
//! SQL fragments with `?` or `@name` placeholders, sub-queries passed as
//! arguments, grouped conditions, and struct or map conditions.
//!
//! # Architecture
//!
//! - **Statement**: the built SQL, its bound values, and an inlined debug form
//! - **Template**: placeholder arguments (`Arg`, `NamedArgs`) and expansion
//! - **Condition**: `AND`/`OR` lists and parenthesized groups
//! - **Select**: the builder
//! - **Execution**: `all`, `first`, `take`, `records`, `first_or_init`, `first_or_create`
//!
//! # Examples
//!
//! ```
//! use primer::args;
//! use primer::query::{Condition, Select};
//!
//! let stmt = Select::from_table("User")
//!     .filter_group(
//!         Condition::new()
//!             .filter("address = ?", args!["shanghai"])
//!             .filter("age = ?", args![19]),
//!     )
//!     .or_filter("age = ?", args![18])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(stmt.sql, r#"SELECT * FROM "User" WHERE (address = $1 AND age = $2) OR age = $3"#);
//! ```

mod condition;
mod error;
mod execution;
mod select;
mod statement;
mod template;

pub(crate) use execution::insert_statement;

#[doc(inline)]
pub use condition::Condition;
#[doc(inline)]
pub use error::QueryError;
#[doc(inline)]
pub use select::{Order, Select};
#[doc(inline)]
pub use statement::Statement;
#[doc(inline)]
pub use template::{named, Arg, NamedArg, NamedArgs};

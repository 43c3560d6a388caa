//! Self-contained lessons, each runnable from the `primer` binary.
//!
//! - [`functions`]: parameters, results, variadics, function values, closures
//! - [`arrays`]: fixed-size arrays and value versus reference passing
//! - [`enums`]: discriminants and index-derived constants
//! - [`floats`]: binary float pitfalls and decimal arithmetic
//! - [`sync`]: a wait group over a coroutine
//! - [`orm`]: query building against the `"User"` table

pub mod arrays;
pub mod enums;
pub mod floats;
pub mod functions;
pub mod orm;
pub mod sync;
pub mod user;

//! Built statements and the writer that assembles them.

use crate::value::{sql_literal, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static PLAIN_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|e| panic!("invalid identifier pattern: {e}"))
});

/// Whether `name` is a bare identifier that should be quoted, as opposed to
/// an expression such as `AVG(age) as avgAge` that must be kept verbatim.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
}

/// Quote an identifier for PostgreSQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A statement ready to execute.
///
/// `sql` uses `$n` placeholders matching `values` in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
    debug_sql: String,
}

impl Statement {
    /// Build a statement from raw SQL and its bound values.
    ///
    /// The debug form of a raw statement is the SQL itself.
    pub fn from_sql(sql: impl Into<String>, values: Vec<Value>) -> Self {
        let sql = sql.into();
        Self {
            debug_sql: sql.clone(),
            sql,
            values,
        }
    }

    /// The statement with every bound value inlined as a literal.
    ///
    /// Only for logs and tests; never execute it.
    pub fn debug_sql(&self) -> &str {
        &self.debug_sql
    }
}

/// Accumulates the parameterized and inlined forms of a statement together.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    debug_sql: String,
    values: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
        self.debug_sql.push_str(s);
    }

    pub(crate) fn push_char(&mut self, c: char) {
        self.sql.push(c);
        self.debug_sql.push(c);
    }

    pub(crate) fn push_value(&mut self, value: &Value) {
        self.values.push(value.clone());
        self.sql.push('$');
        self.sql.push_str(&self.values.len().to_string());
        self.debug_sql.push_str(&sql_literal(value));
    }

    pub(crate) fn push_ident(&mut self, name: &str) {
        self.push_str(&quote_ident(name));
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            values: self.values,
            debug_sql: self.debug_sql,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_numbers_placeholders() {
        let mut w = SqlWriter::new();
        w.push_str("name = ");
        w.push_value(&Value::from("w1"));
        w.push_str(" AND age = ");
        w.push_value(&Value::from(18));
        let stmt = w.finish();

        assert_eq!(stmt.sql, "name = $1 AND age = $2");
        assert_eq!(stmt.debug_sql(), "name = 'w1' AND age = 18");
        assert_eq!(stmt.values.len(), 2);
    }

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("name"));
        assert!(is_plain_identifier("PhoneNumber"));
        assert!(!is_plain_identifier("AVG(age)"));
        assert!(!is_plain_identifier("AVG(age) as avgAge"));
        assert!(!is_plain_identifier("(?) as u"));
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("User"), "\"User\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}

//! SQL fragments with `?` and `@name` placeholders.
//!
//! A fragment such as `"age > (?)"` or `"name = @name"` is kept as written;
//! placeholders are replaced while the statement is built. Placeholders
//! inside string literals and double-quoted identifiers are left alone.

use super::error::QueryError;
use super::select::Select;
use super::statement::SqlWriter;
use crate::value::Value;
use std::collections::BTreeMap;

/// An argument bound to a placeholder.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A single bound value
    Value(Value),
    /// A list, expanded to `(a,b,c)` for `IN ?`
    List(Vec<Value>),
    /// Rows, expanded to `((a,b),(c,d))` for multi-column `IN ?`
    Rows(Vec<Vec<Value>>),
    /// A sub-query rendered in place; its own values are spliced in
    SubQuery(Box<Select>),
}

impl Arg {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Arg::List(values.into_iter().map(Into::into).collect())
    }

    pub fn rows(rows: Vec<Vec<Value>>) -> Self {
        Arg::Rows(rows)
    }

    fn write(&self, w: &mut SqlWriter) -> Result<(), QueryError> {
        match self {
            Arg::Value(value) => w.push_value(value),
            Arg::List(values) => write_tuple(w, values),
            Arg::Rows(rows) => {
                w.push_char('(');
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        w.push_char(',');
                    }
                    write_tuple(w, row);
                }
                if rows.is_empty() {
                    w.push_str("NULL");
                }
                w.push_char(')');
            }
            Arg::SubQuery(select) => select.write_to(w)?,
        }
        Ok(())
    }
}

fn write_tuple(w: &mut SqlWriter, values: &[Value]) {
    w.push_char('(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            w.push_char(',');
        }
        w.push_value(value);
    }
    if values.is_empty() {
        w.push_str("NULL");
    }
    w.push_char(')');
}

macro_rules! impl_arg_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_arg_from_value!(bool, i32, i64, u32, u64, f32, f64, &str, String);

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Select> for Arg {
    fn from(select: Select) -> Self {
        Arg::SubQuery(Box::new(select))
    }
}

/// Build a `Vec<Arg>` from heterogeneous arguments.
///
/// ```
/// use primer::{args, query::Arg};
///
/// let bound: Vec<Arg> = args!["w1", 18];
/// assert_eq!(bound.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::query::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::query::Arg::from($arg)),+]
    };
}

/// One `@name` argument.
#[derive(Debug, Clone)]
pub struct NamedArg {
    pub name: String,
    pub arg: Arg,
}

/// Create a named argument for an `@name` placeholder.
pub fn named(name: impl Into<String>, arg: impl Into<Arg>) -> NamedArg {
    NamedArg {
        name: name.into(),
        arg: arg.into(),
    }
}

/// Arguments for `@name` placeholders, from [`named`] values or a map.
#[derive(Debug, Clone, Default)]
pub struct NamedArgs {
    args: BTreeMap<String, Arg>,
}

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, arg: impl Into<Arg>) -> Self {
        self.args.insert(name.into(), arg.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.args.get(name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl<const N: usize> From<[NamedArg; N]> for NamedArgs {
    fn from(args: [NamedArg; N]) -> Self {
        args.into_iter().collect()
    }
}

impl From<Vec<NamedArg>> for NamedArgs {
    fn from(args: Vec<NamedArg>) -> Self {
        args.into_iter().collect()
    }
}

impl FromIterator<NamedArg> for NamedArgs {
    fn from_iter<I: IntoIterator<Item = NamedArg>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().map(|n| (n.name, n.arg)).collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for NamedArgs
where
    K: Into<String>,
    V: Into<Arg>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            args: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Where the scanner is relative to SQL quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Quoting {
    #[default]
    None,
    /// Inside `'...'`
    Literal,
    /// Inside `"..."`
    Identifier,
}

impl Quoting {
    /// Advance past `c`. A doubled quote (`''` or `""`) closes and reopens,
    /// which leaves the state unchanged across the pair.
    fn step(&mut self, c: char) {
        *self = match (*self, c) {
            (Quoting::None, '\'') => Quoting::Literal,
            (Quoting::None, '"') => Quoting::Identifier,
            (Quoting::Literal, '\'') | (Quoting::Identifier, '"') => Quoting::None,
            (state, _) => state,
        };
    }

    fn is_quoted(self) -> bool {
        self != Quoting::None
    }
}

/// Write `sql`, binding each `?` to the next positional argument.
///
/// Placeholders inside string literals and quoted identifiers are kept.
pub(crate) fn write_positional(
    w: &mut SqlWriter,
    sql: &str,
    args: &[Arg],
) -> Result<(), QueryError> {
    let mut next = 0;
    let mut quoting = Quoting::default();
    for c in sql.chars() {
        quoting.step(c);
        match c {
            '?' if !quoting.is_quoted() => {
                let arg = args.get(next).ok_or_else(|| QueryError::MissingArgument {
                    sql: sql.to_string(),
                    position: next + 1,
                })?;
                arg.write(w)?;
                next += 1;
            }
            _ => w.push_char(c),
        }
    }
    if next != args.len() {
        return Err(QueryError::UnusedArguments {
            sql: sql.to_string(),
            placeholders: next,
            supplied: args.len(),
        });
    }
    Ok(())
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Write `sql`, binding each `@name` to the matching named argument.
pub(crate) fn write_named(
    w: &mut SqlWriter,
    sql: &str,
    args: &NamedArgs,
) -> Result<(), QueryError> {
    let chars: Vec<char> = sql.chars().collect();
    let mut quoting = Quoting::default();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        quoting.step(c);
        let starts_name = c == '@'
            && !quoting.is_quoted()
            && chars.get(i + 1).copied().is_some_and(is_name_start)
            && (i == 0 || !is_name_char(chars[i - 1]));
        if !starts_name {
            w.push_char(c);
            i += 1;
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while end < chars.len() && is_name_char(chars[end]) {
            end += 1;
        }
        let name: String = chars[start..end].iter().collect();
        let arg = args
            .get(&name)
            .ok_or_else(|| QueryError::UnknownNamedArgument {
                sql: sql.to_string(),
                name: name.clone(),
            })?;
        arg.write(w)?;
        i = end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(sql: &str, args: &[Arg]) -> Result<(String, String), QueryError> {
        let mut w = SqlWriter::new();
        write_positional(&mut w, sql, args)?;
        let stmt = w.finish();
        Ok((stmt.sql.clone(), stmt.debug_sql().to_string()))
    }

    #[test]
    fn test_positional_binds_in_order() {
        let (sql, debug) = positional("name = ? AND age = ?", &args!["w1", 18]).unwrap();
        assert_eq!(sql, "name = $1 AND age = $2");
        assert_eq!(debug, "name = 'w1' AND age = 18");
    }

    #[test]
    fn test_positional_ignores_question_mark_in_literal() {
        let (sql, _) = positional("note = 'why?' AND id = ?", &args![1]).unwrap();
        assert_eq!(sql, "note = 'why?' AND id = $1");
    }

    #[test]
    fn test_positional_ignores_question_mark_in_quoted_identifier() {
        let (sql, debug) = positional(r#""what?" = ? AND note = 'it''s?'"#, &args![1]).unwrap();
        assert_eq!(sql, r#""what?" = $1 AND note = 'it''s?'"#);
        assert_eq!(debug, r#""what?" = 1 AND note = 'it''s?'"#);
    }

    #[test]
    fn test_positional_quote_inside_literal_is_not_an_identifier() {
        let (sql, _) = positional(r#"note = 'say "hi"?' AND id = ?"#, &args![2]).unwrap();
        assert_eq!(sql, r#"note = 'say "hi"?' AND id = $1"#);
    }

    #[test]
    fn test_positional_list_expands() {
        let (sql, debug) = positional("id IN ?", &[Arg::list([1, 2, 3])]).unwrap();
        assert_eq!(sql, "id IN ($1,$2,$3)");
        assert_eq!(debug, "id IN (1,2,3)");
    }

    #[test]
    fn test_positional_empty_list_is_null() {
        let (sql, _) = positional("id IN ?", &[Arg::list(Vec::<i32>::new())]).unwrap();
        assert_eq!(sql, "id IN (NULL)");
    }

    #[test]
    fn test_positional_rows_expand() {
        let rows = Arg::rows(vec![
            vec![Value::from("w1"), Value::from(18)],
            vec![Value::from("w2"), Value::from(19)],
        ]);
        let (_, debug) = positional("(name, age) IN ?", &[rows]).unwrap();
        assert_eq!(debug, "(name, age) IN (('w1',18),('w2',19))");
    }

    #[test]
    fn test_positional_missing_argument() {
        let err = positional("a = ? AND b = ?", &args![1]).unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingArgument {
                sql: "a = ? AND b = ?".to_string(),
                position: 2
            }
        );
    }

    #[test]
    fn test_positional_unused_arguments() {
        let err = positional("a = ?", &args![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnusedArguments {
                placeholders: 1,
                supplied: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_named_binds_by_name() {
        let named_args = NamedArgs::from([named("name", "w1"), named("address", "shanghai")]);
        let mut w = SqlWriter::new();
        write_named(&mut w, "name = @name OR address = @address", &named_args).unwrap();
        let stmt = w.finish();
        assert_eq!(stmt.sql, "name = $1 OR address = $2");
        assert_eq!(stmt.debug_sql(), "name = 'w1' OR address = 'shanghai'");
    }

    #[test]
    fn test_named_reuses_argument() {
        let named_args: NamedArgs = [("v", 5)].into_iter().collect();
        let mut w = SqlWriter::new();
        write_named(&mut w, "a = @v OR b = @v", &named_args).unwrap();
        assert_eq!(w.finish().sql, "a = $1 OR b = $2");
    }

    #[test]
    fn test_named_skips_literals_and_emails() {
        let named_args = NamedArgs::new().with("id", 7);
        let mut w = SqlWriter::new();
        write_named(
            &mut w,
            "email <> 'x@host' AND owner@id = 1 AND id = @id",
            &named_args,
        )
        .unwrap();
        assert_eq!(
            w.finish().sql,
            "email <> 'x@host' AND owner@id = 1 AND id = $1"
        );
    }

    #[test]
    fn test_named_unknown_name() {
        let mut w = SqlWriter::new();
        let err = write_named(&mut w, "name = @name", &NamedArgs::new()).unwrap_err();
        assert!(matches!(err, QueryError::UnknownNamedArgument { ref name, .. } if name == "name"));
    }
}

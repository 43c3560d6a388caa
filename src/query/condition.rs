//! WHERE / HAVING conditions and condition groups.

use super::error::QueryError;
use super::statement::SqlWriter;
use super::template::{write_named, write_positional, Arg, NamedArgs};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static LOGICAL_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(and|or)\b").unwrap_or_else(|e| panic!("invalid operator pattern: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    fn keyword(self) -> &'static str {
        match self {
            Conjunction::And => " AND ",
            Conjunction::Or => " OR ",
        }
    }
}

#[derive(Debug, Clone)]
enum Expr {
    Raw { sql: String, args: Vec<Arg> },
    Named { sql: String, args: NamedArgs },
    Eq {
        table: Option<String>,
        column: String,
        value: Value,
    },
    Group(Condition),
}

#[derive(Debug, Clone)]
struct Member {
    conjunction: Conjunction,
    expr: Expr,
}

/// A list of expressions joined by `AND` / `OR`.
///
/// Nested conditions with more than one member are parenthesized, which is
/// how grouped conditions such as
/// `(address = 'shanghai' AND (age = 19 OR age = 20)) OR (...)` are written.
#[derive(Debug, Clone, Default)]
pub struct Condition {
    members: Vec<Member>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    fn push(&mut self, conjunction: Conjunction, expr: Expr) {
        if let Expr::Group(group) = &expr {
            if group.is_empty() {
                return;
            }
        }
        self.members.push(Member { conjunction, expr });
    }

    /// `AND` a fragment with `?` placeholders.
    pub fn filter(mut self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.and_raw(sql.into(), args);
        self
    }

    /// `OR` a fragment with `?` placeholders.
    pub fn or_filter(mut self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.push(
            Conjunction::Or,
            Expr::Raw {
                sql: sql.into(),
                args,
            },
        );
        self
    }

    /// `AND` a fragment with `@name` placeholders.
    pub fn filter_named(mut self, sql: impl Into<String>, args: impl Into<NamedArgs>) -> Self {
        self.and_named(sql.into(), args.into());
        self
    }

    /// `AND` a column equality.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and_eq(None, column.into(), value.into());
        self
    }

    /// `AND` a nested group.
    pub fn group(mut self, group: Condition) -> Self {
        self.push(Conjunction::And, Expr::Group(group));
        self
    }

    /// `OR` a nested group.
    pub fn or_group(mut self, group: Condition) -> Self {
        self.push(Conjunction::Or, Expr::Group(group));
        self
    }

    pub(crate) fn and_raw(&mut self, sql: String, args: Vec<Arg>) {
        self.push(Conjunction::And, Expr::Raw { sql, args });
    }

    pub(crate) fn or_raw(&mut self, sql: String, args: Vec<Arg>) {
        self.push(Conjunction::Or, Expr::Raw { sql, args });
    }

    pub(crate) fn and_named(&mut self, sql: String, args: NamedArgs) {
        self.push(Conjunction::And, Expr::Named { sql, args });
    }

    pub(crate) fn and_eq(&mut self, table: Option<String>, column: String, value: Value) {
        self.push(
            Conjunction::And,
            Expr::Eq {
                table,
                column,
                value,
            },
        );
    }

    pub(crate) fn and_group(&mut self, group: Condition) {
        self.push(Conjunction::And, Expr::Group(group));
    }

    pub(crate) fn or_group_mut(&mut self, group: Condition) {
        self.push(Conjunction::Or, Expr::Group(group));
    }

    /// Top-level `AND`ed equalities, in order.
    ///
    /// Only these can seed a freshly initialized model; raw fragments and
    /// anything under `OR` cannot.
    pub(crate) fn equalities(&self) -> Vec<(&str, &Value)> {
        let all_and = self
            .members
            .iter()
            .skip(1)
            .all(|m| m.conjunction == Conjunction::And);
        if !all_and {
            return Vec::new();
        }
        self.members
            .iter()
            .filter_map(|m| match &m.expr {
                Expr::Eq { column, value, .. } => Some((column.as_str(), value)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn write_to(&self, w: &mut SqlWriter) -> Result<(), QueryError> {
        let compound = self.members.len() > 1;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                w.push_str(member.conjunction.keyword());
            }
            match &member.expr {
                Expr::Raw { sql, args } => {
                    let wrap = compound && LOGICAL_OPERATOR.is_match(sql);
                    if wrap {
                        w.push_char('(');
                    }
                    write_positional(w, sql, args)?;
                    if wrap {
                        w.push_char(')');
                    }
                }
                Expr::Named { sql, args } => {
                    let wrap = compound && LOGICAL_OPERATOR.is_match(sql);
                    if wrap {
                        w.push_char('(');
                    }
                    write_named(w, sql, args)?;
                    if wrap {
                        w.push_char(')');
                    }
                }
                Expr::Eq {
                    table,
                    column,
                    value,
                } => {
                    if let Some(table) = table {
                        w.push_ident(table);
                        w.push_char('.');
                    }
                    w.push_ident(column);
                    w.push_str(" = ");
                    w.push_value(value);
                }
                Expr::Group(group) => {
                    let wrap = group.len() > 1;
                    if wrap {
                        w.push_char('(');
                    }
                    group.write_to(w)?;
                    if wrap {
                        w.push_char(')');
                    }
                }
            }
        }
        Ok(())
    }
}

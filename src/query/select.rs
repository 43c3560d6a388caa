//! Select query builder.
//!
//! `Select` collects clauses the way the lessons write them: a model or a
//! table, an optional projection, conditions with placeholders, grouping,
//! ordering and paging. Nothing is rendered until [`Select::build`].
//! Execution methods live in the `execution` module.

use super::condition::Condition;
use super::error::QueryError;
use super::statement::{is_plain_identifier, SqlWriter, Statement};
use super::template::{write_positional, Arg, NamedArgs};
use crate::model::Model;
use crate::value::{Record, Value};

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
enum Source {
    Table(String),
    Template { sql: String, args: Vec<Arg> },
}

#[derive(Debug, Clone)]
enum Projection {
    Column { table: Option<String>, name: String },
    Raw(String),
}

/// Query builder for selecting records
///
/// # Example
///
/// ```
/// use primer::args;
/// use primer::query::Select;
///
/// let avg_age = Select::from_table("User").select(["AVG(age)"]);
/// let stmt = Select::from_table("User")
///     .filter("age > (?)", args![avg_age])
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     stmt.debug_sql(),
///     r#"SELECT * FROM "User" WHERE age > (SELECT AVG(age) FROM "User")"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Select {
    source: Option<Source>,
    model_table: Option<&'static str>,
    primary_key: Option<&'static str>,
    columns: &'static [&'static str],
    projection: Vec<Projection>,
    condition: Condition,
    group_by: Vec<String>,
    having: Condition,
    order_by: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
    pub(crate) debug: bool,
    pub(crate) attrs: Record,
    pub(crate) assign: Record,
    error: Option<QueryError>,
}

impl Select {
    /// An empty query; give it a source with [`Select::table`] or
    /// [`Select::model`] before building.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select from a plain table name.
    pub fn from_table(name: impl Into<String>) -> Self {
        Self::new().table(name)
    }

    /// Select from a model's table. Equivalent to `M::find()`.
    pub fn from_model<M: Model>() -> Self {
        Self::new().model::<M>()
    }

    /// Bind the query to a model: its table becomes the source (unless one
    /// was set) and its primary key orders [`Select::first`].
    pub fn model<M: Model>(mut self) -> Self {
        self.model_table = Some(M::TABLE);
        self.primary_key = Some(M::PRIMARY_KEY);
        self.columns = M::COLUMNS;
        if self.source.is_none() {
            self.source = Some(Source::Table(M::TABLE.to_string()));
        }
        self
    }

    /// Set the `FROM` clause.
    ///
    /// A bare identifier is quoted; anything else is written verbatim.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.source = Some(if is_plain_identifier(&name) {
            Source::Table(name)
        } else {
            Source::Template {
                sql: name,
                args: Vec::new(),
            }
        });
        self
    }

    /// Set the `FROM` clause to a fragment with `?` placeholders, usually
    /// sub-queries: `table_with("(?) as u", args![sub])`.
    pub fn table_with(mut self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.source = Some(Source::Template {
            sql: sql.into(),
            args,
        });
        self
    }

    /// Choose the projected columns.
    ///
    /// Bare identifiers are quoted; expressions such as `AVG(age) as avgAge`
    /// are kept as written.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = columns
            .into_iter()
            .map(Into::into)
            .map(|name: String| {
                if is_plain_identifier(&name) {
                    Projection::Column { table: None, name }
                } else {
                    Projection::Raw(name)
                }
            })
            .collect();
        self
    }

    /// Project exactly the columns of `P`, qualified with the query's table.
    ///
    /// This is how a narrow struct is scanned from a wider table.
    pub fn select_model<P: Model>(mut self) -> Self {
        let table = self.model_table.unwrap_or(P::TABLE).to_string();
        self.projection = P::COLUMNS
            .iter()
            .map(|name| Projection::Column {
                table: Some(table.clone()),
                name: (*name).to_string(),
            })
            .collect();
        self
    }

    /// `AND` a condition with `?` placeholders.
    pub fn filter(mut self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.condition.and_raw(sql.into(), args);
        self
    }

    /// `OR` a condition with `?` placeholders.
    pub fn or_filter(mut self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.condition.or_raw(sql.into(), args);
        self
    }

    /// `AND` a condition with `@name` placeholders.
    pub fn filter_named(mut self, sql: impl Into<String>, args: impl Into<NamedArgs>) -> Self {
        self.condition.and_named(sql.into(), args.into());
        self
    }

    /// `AND` a condition group; parenthesized when it has several members.
    pub fn filter_group(mut self, group: Condition) -> Self {
        self.condition.and_group(group);
        self
    }

    /// `OR` a condition group; parenthesized when it has several members.
    pub fn or_group(mut self, group: Condition) -> Self {
        self.condition.or_group_mut(group);
        self
    }

    /// `AND` one equality per non-zero field of `model`.
    ///
    /// Columns are qualified with the model's table.
    pub fn filter_model<M: Model>(mut self, model: &M) -> Self {
        match model.non_zero_fields() {
            Ok(fields) => {
                for (column, value) in fields {
                    match M::bind_value(&column, &value) {
                        Ok(bound) => self.condition.and_eq(Some(M::TABLE.to_string()), column, bound),
                        Err(e) => self.record_error(e),
                    }
                }
            }
            Err(e) => self.record_error(e),
        }
        self
    }

    /// `AND` one equality per entry, in key order.
    ///
    /// On a model query, keys are matched to its columns ignoring case.
    pub fn filter_map<I, K, V>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries: Vec<(String, Value)> = conditions
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (column, value) in entries {
            let column = self
                .columns
                .iter()
                .find(|known| known.eq_ignore_ascii_case(&column))
                .map_or(column, |known| (*known).to_string());
            self.condition.and_eq(None, column, value);
        }
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// `AND` a `HAVING` condition with `?` placeholders.
    pub fn having(mut self, sql: impl Into<String>, args: Vec<Arg>) -> Self {
        self.having.and_raw(sql.into(), args);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Log every statement this query runs, with values inlined.
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Attributes applied only when `first_or_init` finds nothing.
    /// They never reach the generated SQL.
    pub fn attrs<M: Model>(mut self, model: &M) -> Self {
        match model.non_zero_fields() {
            Ok(fields) => self.attrs.extend(fields),
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Single-column form of [`Select::attrs`].
    pub fn attr(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs
            .insert(column.into(), crate::value::value_to_json(&value.into()));
        self
    }

    /// Attributes applied by `first_or_init` whether or not a row was found.
    /// They never reach the generated `SELECT`.
    pub fn assign<M: Model>(mut self, model: &M) -> Self {
        match model.non_zero_fields() {
            Ok(fields) => self.assign.extend(fields),
            Err(e) => self.record_error(e),
        }
        self
    }

    /// Single-column form of [`Select::assign`].
    pub fn assign_value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assign
            .insert(column.into(), crate::value::value_to_json(&value.into()));
        self
    }

    fn record_error(&mut self, error: QueryError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub(crate) fn condition(&self) -> &Condition {
        &self.condition
    }

    pub(crate) fn model_table(&self) -> Option<&'static str> {
        self.model_table
    }

    /// The same query reduced to its first row by primary key.
    pub(crate) fn first_by_primary_key(&self) -> Self {
        let mut first = self.clone();
        if first.order_by.is_empty() {
            if let (Some(table), Some(pk)) = (first.model_table, first.primary_key) {
                first.order_by.push((format!("{table}.{pk}"), Order::Asc));
            }
        }
        first.limit = Some(1);
        first
    }

    /// Render the statement.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` when there is no source, a placeholder and its
    /// arguments disagree, or a model could not be converted.
    pub fn build(&self) -> Result<Statement, QueryError> {
        let mut w = SqlWriter::new();
        self.write_to(&mut w)?;
        Ok(w.finish())
    }

    pub(crate) fn write_to(&self, w: &mut SqlWriter) -> Result<(), QueryError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }

        w.push_str("SELECT ");
        if self.projection.is_empty() {
            w.push_char('*');
        }
        for (i, column) in self.projection.iter().enumerate() {
            if i > 0 {
                w.push_char(',');
            }
            match column {
                Projection::Column { table, name } => {
                    if let Some(table) = table {
                        w.push_ident(table);
                        w.push_char('.');
                    }
                    w.push_ident(name);
                }
                Projection::Raw(sql) => w.push_str(sql),
            }
        }

        w.push_str(" FROM ");
        match self.source.as_ref().ok_or(QueryError::MissingTable)? {
            Source::Table(name) => w.push_ident(name),
            Source::Template { sql, args } => write_positional(w, sql, args)?,
        }

        if !self.condition.is_empty() {
            w.push_str(" WHERE ");
            self.condition.write_to(w)?;
        }

        if !self.group_by.is_empty() {
            w.push_str(" GROUP BY ");
            for (i, column) in self.group_by.iter().enumerate() {
                if i > 0 {
                    w.push_char(',');
                }
                write_column(w, column);
            }
        }

        if !self.having.is_empty() {
            w.push_str(" HAVING ");
            self.having.write_to(w)?;
        }

        if !self.order_by.is_empty() {
            w.push_str(" ORDER BY ");
            for (i, (column, order)) in self.order_by.iter().enumerate() {
                if i > 0 {
                    w.push_char(',');
                }
                write_column(w, column);
                if *order == Order::Desc {
                    w.push_str(" DESC");
                }
            }
        }

        if let Some(limit) = self.limit {
            w.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            w.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(())
    }
}

/// Quote `column` or `table.column` when made of bare identifiers,
/// otherwise write it verbatim.
fn write_column(w: &mut SqlWriter, column: &str) {
    match column.split_once('.') {
        Some((table, name)) if is_plain_identifier(table) && is_plain_identifier(name) => {
            w.push_ident(table);
            w.push_char('.');
            w.push_ident(name);
        }
        _ if is_plain_identifier(column) => w.push_ident(column),
        _ => w.push_str(column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::query::named;

    fn debug(select: Select) -> String {
        select.build().unwrap().debug_sql().to_string()
    }

    #[test]
    fn test_select_star() {
        assert_eq!(debug(Select::from_table("User")), r#"SELECT * FROM "User""#);
    }

    #[test]
    fn test_select_columns_quotes_identifiers_only() {
        let q = Select::from_table("User").select(["name", "AVG(age) as avgAge"]);
        assert_eq!(debug(q), r#"SELECT "name",AVG(age) as avgAge FROM "User""#);
    }

    #[test]
    fn test_missing_table() {
        assert_eq!(Select::new().build().unwrap_err(), QueryError::MissingTable);
    }

    #[test]
    fn test_parameters_are_numbered_across_sub_queries() {
        let sub = Select::from_table("User")
            .select(["AVG(age)"])
            .filter("name LIKE ?", args!["%wang%"]);
        let stmt = Select::from_table("User")
            .filter("address = ?", args!["shanghai"])
            .filter("age > (?)", args![sub])
            .filter("id <> ?", args![3])
            .build()
            .unwrap();

        assert_eq!(
            stmt.sql,
            r#"SELECT * FROM "User" WHERE address = $1 AND age > (SELECT AVG(age) FROM "User" WHERE name LIKE $2) AND id <> $3"#
        );
        assert_eq!(stmt.values.len(), 3);
    }

    #[test]
    fn test_group_by_having() {
        let q = Select::from_table("User")
            .select(["AVG(age) as avgAge"])
            .group_by("name")
            .having("AVG(age) > ?", args![20]);
        assert_eq!(
            debug(q),
            r#"SELECT AVG(age) as avgAge FROM "User" GROUP BY "name" HAVING AVG(age) > 20"#
        );
    }

    #[test]
    fn test_from_template() {
        let inner = Select::from_table("User").select(["name", "age"]);
        let q = Select::new()
            .table_with("(?) as u", args![inner])
            .filter("age = ?", args![18]);
        assert_eq!(
            debug(q),
            r#"SELECT * FROM (SELECT "name","age" FROM "User") as u WHERE age = 18"#
        );
    }

    #[test]
    fn test_order_limit_offset() {
        let q = Select::from_table("User")
            .order_by("User.Id", Order::Desc)
            .order_by("name", Order::Asc)
            .limit(10)
            .offset(20);
        assert_eq!(
            debug(q),
            r#"SELECT * FROM "User" ORDER BY "User"."Id" DESC,"name" LIMIT 10 OFFSET 20"#
        );
    }

    #[test]
    fn test_filter_map_sorts_keys() {
        let q = Select::from_table("User").filter_map([("name", "w1"), ("address", "shanghai")]);
        assert_eq!(
            debug(q),
            r#"SELECT * FROM "User" WHERE "address" = 'shanghai' AND "name" = 'w1'"#
        );
    }

    #[test]
    fn test_filter_map_resolves_model_columns() {
        let q = Select::from_model::<crate::lessons::user::User>().filter_map([("name", "w1")]);
        assert_eq!(debug(q), r#"SELECT * FROM "User" WHERE "Name" = 'w1'"#);
    }

    #[test]
    fn test_named_filter() {
        let q = Select::from_table("User").filter_named(
            "name = @name OR address = @address",
            [named("name", "w1"), named("address", "shanghai")],
        );
        assert_eq!(
            debug(q),
            r#"SELECT * FROM "User" WHERE name = 'w1' OR address = 'shanghai'"#
        );
    }

    #[test]
    fn test_placeholder_errors_surface_at_build() {
        let err = Select::from_table("User")
            .filter("age = ?", args![])
            .build()
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingArgument { position: 1, .. }));
    }
}

//! Query execution methods for `Select`.
//!
//! Every method builds the statement, hands it to an [`Executor`], and
//! scans the returned records. Queries marked with `.debug()` log their
//! inlined SQL, elapsed time and row count under the `primer::sql` target.

use super::error::QueryError;
use super::select::Select;
use super::statement::{quote_ident, SqlWriter, Statement};
use crate::executor::{DbError, Executor};
use crate::model::Model;
use crate::value::{value_to_json, Record};
use std::time::Instant;

impl Select {
    fn run<Ex>(&self, executor: &Ex, statement: &Statement) -> Result<Vec<Record>, DbError>
    where
        Ex: Executor + ?Sized,
    {
        let start = Instant::now();
        let result = executor.query_all(statement);
        if self.debug {
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            match &result {
                Ok(rows) => log::info!(
                    target: "primer::sql",
                    "[{elapsed_ms:.3}ms] [rows:{}] {}",
                    rows.len(),
                    statement.debug_sql()
                ),
                Err(e) => log::warn!(
                    target: "primer::sql",
                    "[{elapsed_ms:.3}ms] {} failed: {e}",
                    statement.debug_sql()
                ),
            }
        }
        result
    }

    /// Execute the query and return every row as a record.
    pub fn records<Ex>(&self, executor: &Ex) -> Result<Vec<Record>, DbError>
    where
        Ex: Executor + ?Sized,
    {
        let statement = self.build()?;
        self.run(executor, &statement)
    }

    /// Execute the query ordered by primary key and return the first row as
    /// a record, or `None` if nothing matched.
    pub fn first_record<Ex>(&self, executor: &Ex) -> Result<Option<Record>, DbError>
    where
        Ex: Executor + ?Sized,
    {
        let first = self.first_by_primary_key();
        let statement = first.build()?;
        Ok(first.run(executor, &statement)?.into_iter().next())
    }

    /// Execute the query and return all results
    pub fn all<M, Ex>(&self, executor: &Ex) -> Result<Vec<M>, DbError>
    where
        M: Model,
        Ex: Executor + ?Sized,
    {
        self.records(executor)?
            .iter()
            .map(M::from_record)
            .collect()
    }

    /// Execute the query ordered by primary key and return the first result,
    /// or `None` if no results
    pub fn first<M, Ex>(&self, executor: &Ex) -> Result<Option<M>, DbError>
    where
        M: Model,
        Ex: Executor + ?Sized,
    {
        self.first_record(executor)?
            .as_ref()
            .map(M::from_record)
            .transpose()
    }

    /// Execute the query with `LIMIT 1` and no ordering.
    pub fn take<M, Ex>(&self, executor: &Ex) -> Result<Option<M>, DbError>
    where
        M: Model,
        Ex: Executor + ?Sized,
    {
        let one = self.clone().limit(1);
        one.records(executor)?
            .first()
            .map(M::from_record)
            .transpose()
    }

    /// Find the first matching row, or initialize a model without saving it.
    ///
    /// When a row is found, the `assign` attributes are applied on top of it
    /// and the `attrs` attributes are ignored. Otherwise the model is built
    /// from the query's equality conditions, then `attrs`, then `assign`.
    pub fn first_or_init<M, Ex>(&self, executor: &Ex) -> Result<M, DbError>
    where
        M: Model,
        Ex: Executor + ?Sized,
    {
        match self.first_record(executor)? {
            Some(mut found) => {
                merge::<M>(&mut found, &self.assign);
                M::from_record(&found)
            }
            None => M::from_record(&self.initial_record::<M>()),
        }
    }

    /// Find the first matching row, or insert an initialized one.
    ///
    /// A found row with `assign` attributes is updated in place by primary
    /// key; a missing row is built like [`Select::first_or_init`] and
    /// inserted with `RETURNING *`.
    pub fn first_or_create<M, Ex>(&self, executor: &Ex) -> Result<M, DbError>
    where
        M: Model,
        Ex: Executor + ?Sized,
    {
        if let Some(mut found) = self.first_record(executor)? {
            if !self.assign.is_empty() {
                let update = update_statement::<M>(&found, &self.assign)?;
                let affected = executor.execute(&update)?;
                if self.debug {
                    log::info!(target: "primer::sql", "[rows:{affected}] {}", update.debug_sql());
                }
                merge::<M>(&mut found, &self.assign);
            }
            return M::from_record(&found);
        }

        let mut initial = self.initial_record::<M>();
        initial.retain(|_, value| !crate::value::is_zero(value));
        let insert = insert_statement::<M>(&initial)?;
        let created = self.run(executor, &insert)?;
        match created.first() {
            Some(row) => M::from_record(row),
            None => M::from_record(&initial),
        }
    }

    fn initial_record<M: Model>(&self) -> Record {
        let mut record = Record::new();
        let own_table = self.model_table().map_or(true, |table| table == M::TABLE);
        if own_table {
            for (column, value) in self.condition().equalities() {
                record.insert(M::resolve_column(column), value_to_json(value));
            }
        }
        merge::<M>(&mut record, &self.attrs);
        merge::<M>(&mut record, &self.assign);
        record
    }
}

fn merge<M: Model>(target: &mut Record, attributes: &Record) {
    for (column, value) in attributes {
        target.insert(M::resolve_column(column), value.clone());
    }
}

pub(crate) fn insert_statement<M: Model>(record: &Record) -> Result<Statement, QueryError> {
    let mut w = SqlWriter::new();
    w.push_str("INSERT INTO ");
    w.push_ident(M::TABLE);
    if record.is_empty() {
        w.push_str(" DEFAULT VALUES RETURNING *");
        return Ok(w.finish());
    }
    // Model column order, so the statement does not depend on map ordering.
    let mut entries: Vec<(&String, &serde_json::Value)> = record.iter().collect();
    entries.sort_by_key(|(column, _)| {
        M::COLUMNS
            .iter()
            .position(|known| known == column)
            .unwrap_or(usize::MAX)
    });
    let columns: Vec<String> = entries.iter().map(|(k, _)| quote_ident(k)).collect();
    w.push_str(&format!(" ({}) VALUES (", columns.join(",")));
    for (i, (column, value)) in entries.iter().enumerate() {
        if i > 0 {
            w.push_char(',');
        }
        w.push_value(&M::bind_value(column, value)?);
    }
    w.push_str(") RETURNING *");
    Ok(w.finish())
}

fn update_statement<M: Model>(found: &Record, assign: &Record) -> Result<Statement, DbError> {
    let key = found.get(M::PRIMARY_KEY).ok_or_else(|| {
        DbError::Other(format!(
            "row from {} has no {} column to update by",
            M::TABLE,
            M::PRIMARY_KEY
        ))
    })?;

    let mut w = SqlWriter::new();
    w.push_str("UPDATE ");
    w.push_ident(M::TABLE);
    w.push_str(" SET ");
    for (i, (column, value)) in assign.iter().enumerate() {
        if i > 0 {
            w.push_char(',');
        }
        w.push_ident(&M::resolve_column(column));
        w.push_str(" = ");
        w.push_value(&M::bind_value(column, value)?);
    }
    w.push_str(" WHERE ");
    w.push_ident(M::PRIMARY_KEY);
    w.push_str(" = ");
    w.push_value(&M::bind_value(M::PRIMARY_KEY, key)?);
    Ok(w.finish())
}

//! In-memory executor that records statements and replays queued results.
//!
//! Tests queue the rows each query should return; the CLI's `--dry-run`
//! mode uses an empty mock to print the SQL a lesson would run.

use crate::executor::{DbError, Executor};
use crate::query::Statement;
use crate::value::Record;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An [`Executor`] that never touches a database.
///
/// Queued query results are consumed in order; once the queue is empty
/// every query returns no rows and every statement affects zero rows.
///
/// # Example
///
/// ```
/// use primer::executor::Executor;
/// use primer::mock::MockExecutor;
/// use primer::query::Statement;
/// use serde_json::json;
///
/// let mut row = primer::value::Record::new();
/// row.insert("Name".to_string(), json!("w1"));
/// let mock = MockExecutor::new().append_query_results(vec![vec![row]]);
///
/// let rows = mock.query_all(&Statement::from_sql("SELECT 1", vec![])).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(mock.statements().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockExecutor {
    query_results: Mutex<VecDeque<Result<Vec<Record>, DbError>>>,
    exec_results: Mutex<VecDeque<Result<u64, DbError>>>,
    statements: Mutex<Vec<Statement>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue row sets, one per upcoming query.
    pub fn append_query_results(self, results: Vec<Vec<Record>>) -> Self {
        lock(&self.query_results).extend(results.into_iter().map(Ok));
        self
    }

    /// Queue failures, one per upcoming query.
    pub fn append_query_errors(self, errors: Vec<DbError>) -> Self {
        lock(&self.query_results).extend(errors.into_iter().map(Err));
        self
    }

    /// Queue affected-row counts, one per upcoming `execute`.
    pub fn append_exec_results(self, results: Vec<u64>) -> Self {
        lock(&self.exec_results).extend(results.into_iter().map(Ok));
        self
    }

    /// Every statement run so far, in order.
    pub fn statements(&self) -> Vec<Statement> {
        lock(&self.statements).clone()
    }

    /// The inlined SQL of every statement run so far.
    pub fn debug_sql(&self) -> Vec<String> {
        lock(&self.statements)
            .iter()
            .map(|s| s.debug_sql().to_string())
            .collect()
    }
}

impl Executor for MockExecutor {
    fn query_all(&self, statement: &Statement) -> Result<Vec<Record>, DbError> {
        lock(&self.statements).push(statement.clone());
        lock(&self.query_results)
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn execute(&self, statement: &Statement) -> Result<u64, DbError> {
        lock(&self.statements).push(statement.clone());
        lock(&self.exec_results).pop_front().unwrap_or(Ok(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(sql: &str) -> Statement {
        Statement::from_sql(sql, vec![])
    }

    #[test]
    fn test_results_are_replayed_in_order() {
        let mut row = Record::new();
        row.insert("Id".to_string(), serde_json::json!(1));
        let mock = MockExecutor::new().append_query_results(vec![vec![row], vec![]]);

        assert_eq!(mock.query_all(&stmt("SELECT 1")).unwrap().len(), 1);
        assert!(mock.query_all(&stmt("SELECT 2")).unwrap().is_empty());
        assert!(mock.query_all(&stmt("SELECT 3")).unwrap().is_empty());
        assert_eq!(mock.debug_sql(), vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn test_errors_are_replayed() {
        let mock = MockExecutor::new()
            .append_query_errors(vec![DbError::Other("Simulated failure".to_string())]);

        let err = mock.query_all(&stmt("SELECT fail")).unwrap_err();
        assert!(matches!(err, DbError::Other(ref msg) if msg.contains("Simulated failure")));
    }

    #[test]
    fn test_execute_defaults_to_zero() {
        let mock = MockExecutor::new().append_exec_results(vec![3]);
        assert_eq!(mock.execute(&stmt("DELETE FROM t")).unwrap(), 3);
        assert_eq!(mock.execute(&stmt("DELETE FROM t")).unwrap(), 0);
    }
}

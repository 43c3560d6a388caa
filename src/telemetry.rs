//! Tracing integration.
//!
//! With the `tracing` feature enabled, query execution and connection setup
//! run inside spans so a subscriber can time them. Log records from the `log`
//! facade are unaffected.

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};
    use tracing_subscriber::fmt::format::FmtSpan;

    /// Longest SQL text recorded on a span.
    const MAX_STATEMENT_LEN: usize = 256;

    /// Span for executing one statement.
    pub fn execute_query_span(sql: &str) -> Span {
        info_span!("primer.execute_query", db.system = "postgresql", db.statement = %truncate(sql))
    }

    /// Span for establishing a connection.
    pub fn acquire_connection_span() -> Span {
        info_span!("primer.acquire_connection", db.system = "postgresql")
    }

    /// Span for one lesson run from the command line.
    pub fn lesson_span(name: &str) -> Span {
        info_span!("primer.lesson", lesson = name)
    }

    fn truncate(sql: &str) -> &str {
        match sql.char_indices().nth(MAX_STATEMENT_LEN) {
            Some((idx, _)) => &sql[..idx],
            None => sql,
        }
    }

    /// Install a `fmt` subscriber that reports each span as it closes, with
    /// its duration. `DEBUG` and up when `verbose`, `INFO` and up otherwise.
    ///
    /// Returns `false` when a global subscriber was already set.
    pub fn init_subscriber(verbose: bool) -> bool {
        let level = if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .is_ok()
    }

}

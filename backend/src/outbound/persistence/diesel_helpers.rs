//! Error mapping and time budgeting shared by the Diesel repositories.

use std::future::Future;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::pool::{DbPool, PoolError};

/// Map pool errors into a repository's connection variant.
pub(crate) fn map_basic_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.into_message())
}

/// Map Diesel errors into a repository's query or connection variant.
///
/// Database messages stay in the debug log; callers get a stable summary.
pub(crate) fn map_basic_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(&'static str) -> E,
    connection: impl FnOnce(&'static str) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated")
        }
        _ => query("database error"),
    }
}

/// Whether `error` is a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Run `operation` within the pool's time budget.
///
/// An expired budget is reported through `timed_out`, which repositories
/// point at their connection variant so callers see a 503.
pub(crate) async fn within_budget<T, E>(
    pool: &DbPool,
    operation_name: &'static str,
    operation: impl Future<Output = Result<T, E>>,
    timed_out: impl FnOnce(String) -> E,
) -> Result<T, E> {
    let budget = pool.operation_timeout();
    if let Ok(result) = tokio::time::timeout(budget, operation).await {
        result
    } else {
        warn!(operation = operation_name, ?budget, "database operation timed out");
        Err(timed_out(format!(
            "{operation_name} exceeded {}s",
            budget.as_secs()
        )))
    }
}

/// Convert rows, mapping the first failure through `map_err`.
pub(crate) fn collect_rows<R, T, E>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    rows.into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_err)
}

/// Escape `LIKE` wildcards so `text` matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
    }

    fn map(error: DieselError) -> Mapped {
        map_basic_diesel_error(
            error,
            |message| Mapped::Query(message.to_owned()),
            |message| Mapped::Connection(message.to_owned()),
        )
    }

    #[rstest]
    fn not_found_is_a_query_error() {
        assert_eq!(
            map(DieselError::NotFound),
            Mapped::Query("record not found".to_owned())
        );
    }

    #[rstest]
    fn rollback_is_a_query_error() {
        assert!(matches!(map(DieselError::RollbackTransaction), Mapped::Query(_)));
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn collect_rows_stops_at_first_bad_row() {
        let result: Result<Vec<i32>, Mapped> = collect_rows(
            vec!["1", "x", "3"],
            |raw| raw.parse().map_err(|_| format!("bad row {raw}")),
            Mapped::Query,
        );
        assert_eq!(result, Err(Mapped::Query("bad row x".to_owned())));
    }

    #[rstest]
    #[case("Ikeja", "Ikeja")]
    #[case("50%_off\\", "50\\%\\_off\\\\")]
    fn like_wildcards_are_escaped(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape_like(text), expected);
    }
}

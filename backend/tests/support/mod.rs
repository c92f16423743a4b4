//! Shared helpers for the embedded PostgreSQL integration suites.
//!
//! Each file under `backend/tests/` compiles as its own crate, so every suite
//! pulls these helpers in with `mod support;`.

mod cluster_skip;
mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_template_database, shared_cluster_handle};

use marketplace::domain::{Role, ServiceRole, UserId};
use postgres::{Client, NoTls};

/// Render a `postgres` error with the SQLSTATE and server detail.
///
/// The `Display` form collapses database errors to `db error`, which hides
/// everything useful in CI logs.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}

/// Insert a member row directly so suites can reference it by foreign key.
pub fn seed_user(url: &str, role: Role, service_role: ServiceRole) -> Result<UserId, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let id = UserId::random();
    let uuid = *id.as_uuid();
    let email = format!("{uuid}@example.com");
    client
        .execute(
            "INSERT INTO users (id, email, role, service_role) VALUES ($1, $2, $3, $4)",
            &[&uuid, &email, &role.as_str(), &service_role.as_str()],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(id)
}

//! Embedded PostgreSQL provisioning for integration suites.
//!
//! Migrations are applied once to a template database named after a hash of
//! the migrations directory. Every test then gets a fresh clone of that
//! template, so suites never see each other's rows.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use marketplace::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "marketplace_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);
const CLUSTER_PASSWORD: &str = "marketplace_embedded_test";

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, String> {
    let hash = hash_directory(migrations_dir()).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Run `attempt` until it succeeds or the retries run out, keeping the last
/// failure.
fn with_retries<T>(mut attempt: impl FnMut(usize) -> Result<T, String>) -> Result<T, String> {
    let mut last_error = String::from("no attempt made");
    for number in 1..=PROVISION_RETRIES {
        match attempt(number) {
            Ok(value) => return Ok(value),
            Err(error) => last_error = error,
        }
        if number < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// The process-wide embedded cluster.
///
/// A fixed `PG_PASSWORD` keeps a reused data directory usable across test
/// binaries; the library otherwise generates a new password per process.
pub fn shared_cluster_handle() -> Result<&'static ClusterHandle, String> {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library starts any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", CLUSTER_PASSWORD);
        }
    }
    with_retries(|number| {
        pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
            .map_err(|err| format!("start cluster: attempt {number}/{PROVISION_RETRIES}: {err}"))
    })
}

/// Create the migrated template on first use and return its name.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        run_migrations(&url).map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(template_name)
}

/// A temporary database cloned from the migrated template.
pub fn provision_template_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    with_retries(|number| {
        let template_name = ensure_template_database(cluster)
            .map_err(|err| format!("attempt {number}/{PROVISION_RETRIES}: {err}"))?;
        let db_name = format!("test_{}", Uuid::new_v4().simple());
        cluster
            .temporary_database_from_template(db_name.as_str(), template_name.as_str())
            .map_err(|err| {
                format!("clone template: attempt {number}/{PROVISION_RETRIES}: {err:?}")
            })
    })
}

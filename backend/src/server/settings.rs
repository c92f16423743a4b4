//! Process settings loaded via OrthoConfig.
//!
//! Every field is optional so a bare `marketplace` invocation starts in
//! development mode. Accessors apply defaults and parse the raw strings.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use marketplace::outbound::distance_matrix::DEFAULT_DISTANCE_MATRIX_URL;
use marketplace::outbound::paystack::DEFAULT_PAYSTACK_BASE_URL;
use marketplace::outbound::persistence::{DEFAULT_OPERATION_TIMEOUT, PoolConfig};
use marketplace::outbound::retry::RetryPolicy;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_ROOT: &str = "var/uploads";
const DEFAULT_STORAGE_PUBLIC_URL: &str = "http://localhost:8080/uploads/";
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// A setting that was present but could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl SettingsError {
    fn invalid(field: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Invalid {
            field,
            message: err.to_string(),
        }
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|err| SettingsError::invalid(field, err))
}

/// Settings for the marketplace server, read from CLI flags, the
/// `MARKETPLACE_*` environment and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETPLACE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Fixture adapters are used when absent.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    /// Time budget for a single repository operation.
    pub db_operation_timeout_secs: Option<u64>,
    pub paystack_secret_key: Option<String>,
    pub paystack_base_url: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub distance_matrix_url: Option<String>,
    /// Directory that receives uploaded service images.
    pub storage_root: Option<PathBuf>,
    /// Public URL the storage root is served from.
    pub storage_public_url: Option<String>,
    /// Attempts per outbound gateway or estimator call.
    pub gateway_retry_attempts: Option<u32>,
    pub http_timeout_secs: Option<u64>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| SettingsError::invalid("bind_addr", err))
    }

    /// Pool settings when a database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let timeout = self
            .db_operation_timeout_secs
            .map_or(DEFAULT_OPERATION_TIMEOUT, Duration::from_secs);
        Some(
            PoolConfig::new(url)
                .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS))
                .with_operation_timeout(timeout),
        )
    }

    pub fn paystack_secret_key(&self) -> Option<Zeroizing<String>> {
        self.paystack_secret_key.clone().map(Zeroizing::new)
    }

    pub fn paystack_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "paystack_base_url",
            self.paystack_base_url
                .as_deref()
                .unwrap_or(DEFAULT_PAYSTACK_BASE_URL),
        )
    }

    pub fn google_maps_api_key(&self) -> Option<Zeroizing<String>> {
        self.google_maps_api_key.clone().map(Zeroizing::new)
    }

    pub fn distance_matrix_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "distance_matrix_url",
            self.distance_matrix_url
                .as_deref()
                .unwrap_or(DEFAULT_DISTANCE_MATRIX_URL),
        )
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT))
    }

    pub fn storage_public_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "storage_public_url",
            self.storage_public_url
                .as_deref()
                .unwrap_or(DEFAULT_STORAGE_PUBLIC_URL),
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.gateway_retry_attempts {
            Some(attempts) => RetryPolicy::new(attempts, DEFAULT_RETRY_DELAY),
            None => RetryPolicy::default(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "MARKETPLACE_BIND_ADDR",
        "MARKETPLACE_DATABASE_URL",
        "MARKETPLACE_DB_MAX_CONNECTIONS",
        "MARKETPLACE_PAYSTACK_SECRET_KEY",
        "MARKETPLACE_GATEWAY_RETRY_ATTEMPTS",
        "MARKETPLACE_HTTP_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("marketplace")]).expect("settings should load")
    }

    #[rstest]
    fn defaults_start_in_development_mode() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.pool_config().is_none());
        assert!(settings.paystack_secret_key().is_none());
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.http_timeout(), Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        assert_eq!(
            settings.paystack_base_url().expect("default url").as_str(),
            DEFAULT_PAYSTACK_BASE_URL
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("MARKETPLACE_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "MARKETPLACE_DATABASE_URL",
                Some("postgres://localhost/marketplace".to_owned()),
            ),
            ("MARKETPLACE_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("MARKETPLACE_PAYSTACK_SECRET_KEY", Some("sk_test_x".to_owned())),
            ("MARKETPLACE_GATEWAY_RETRY_ATTEMPTS", Some("5".to_owned())),
            ("MARKETPLACE_HTTP_TIMEOUT_SECS", Some("3".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("address").to_string(),
            "127.0.0.1:9000"
        );
        let pool = settings.pool_config().expect("pool configured");
        assert_eq!(pool.database_url(), "postgres://localhost/marketplace");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(
            settings.paystack_secret_key().as_deref().map(String::as_str),
            Some("sk_test_x")
        );
        assert_eq!(settings.retry_policy().attempts(), 5);
        assert_eq!(settings.http_timeout(), Duration::from_secs(3));
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env([("MARKETPLACE_BIND_ADDR", Some("not-an-address".to_owned()))]);

        let error = load_from_empty_args().bind_addr().expect_err("invalid");

        assert!(error.to_string().contains("bind_addr"));
    }
}

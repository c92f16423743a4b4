//! Port for resolving opaque bearer tokens to user identifiers.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

/// Token accepted by [`FixtureTokenVerifier`].
pub const FIXTURE_TOKEN: &str = "fixture-token";
/// User resolved for [`FIXTURE_TOKEN`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

define_port_error! {
    /// Errors raised while verifying bearer tokens.
    pub enum TokenVerifierError {
        /// Token store could not be reached.
        Connection => "token store connection failed: {message}",
        /// Token lookup failed during execution.
        Query => "token lookup failed: {message}",
    }
}

/// Resolve a presented bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// The owning user, or `None` for unknown tokens.
    async fn verify(&self, token: &str) -> Result<Option<UserId>, TokenVerifierError>;
}

/// Accepts only [`FIXTURE_TOKEN`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenVerifier;

#[async_trait]
impl TokenVerifier for FixtureTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<UserId>, TokenVerifierError> {
        if token != FIXTURE_TOKEN {
            return Ok(None);
        }
        UserId::new(FIXTURE_USER_ID)
            .map(Some)
            .map_err(|err| TokenVerifierError::query(format!("invalid fixture user id: {err}")))
    }
}

//! Bearer token store keyed by SHA-256 digest.
//!
//! Raw tokens are handed to the caller once at issue time and never
//! persisted; lookups hash the presented token and match the digest.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{TokenVerifier, TokenVerifierError};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error, within_budget};
use super::models::NewApiTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::api_tokens;

const TOKEN_BYTES: usize = 32;

/// Lowercase hex SHA-256 of a raw token.
pub fn token_digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn map_pool_error(error: PoolError) -> TokenVerifierError {
    map_basic_pool_error(error, TokenVerifierError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TokenVerifierError {
    map_basic_diesel_error(error, TokenVerifierError::query, TokenVerifierError::connection)
}

/// Diesel implementation of [`TokenVerifier`] that can also issue tokens.
#[derive(Clone)]
pub struct DieselTokenStore {
    pool: DbPool,
}

impl DieselTokenStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Mint a token for `user_id`, store its digest, and return the raw token.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenVerifierError`] when the digest cannot be stored,
    /// including when the user does not exist.
    pub async fn issue(&self, user_id: &UserId) -> Result<String, TokenVerifierError> {
        let raw = generate_token();
        let digest = token_digest(&raw);
        let row = NewApiTokenRow {
            token_digest: &digest,
            user_id: *user_id.as_uuid(),
        };
        within_budget(
            &self.pool,
            "api_tokens.issue",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(api_tokens::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map_err(map_diesel_error)
            },
            TokenVerifierError::connection,
        )
        .await?;
        info!(%user_id, "api token issued");
        Ok(raw)
    }
}

#[async_trait]
impl TokenVerifier for DieselTokenStore {
    async fn verify(&self, token: &str) -> Result<Option<UserId>, TokenVerifierError> {
        let digest = token_digest(token);
        let owner: Option<Uuid> = within_budget(
            &self.pool,
            "api_tokens.verify",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                api_tokens::table
                    .filter(api_tokens::token_digest.eq(&digest))
                    .select(api_tokens::user_id)
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)
            },
            TokenVerifierError::connection,
        )
        .await?;
        Ok(owner.map(UserId::from_uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn digest_is_lowercase_sha256_hex() {
        assert_eq!(
            token_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[rstest]
    fn generated_tokens_are_distinct_hex() {
        let first = generate_token();
        let second = generate_token();
        assert_eq!(first.len(), TOKEN_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}

//! Bearer token authentication.
//!
//! Handlers take an [`AuthenticatedUser`] argument to require a signed-in
//! caller. The extractor reads `Authorization: Bearer <token>`, resolves the
//! token through [`TokenVerifier`](crate::domain::ports::TokenVerifier), and
//! loads the user record. Every failure to identify the caller is a 401.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::TokenVerifierError;
use crate::domain::{Error, User, map_user_repository_error};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The caller identified by the request's bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Borrow the resolved user.
    pub fn user(&self) -> &User {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::unauthorized("authorization must use the Bearer scheme"))
}

fn map_token_error(error: TokenVerifierError) -> Error {
    match error {
        TokenVerifierError::Connection { message } => {
            Error::service_unavailable(format!("token store unavailable: {message}"))
        }
        TokenVerifierError::Query { message } => {
            Error::internal(format!("token lookup failed: {message}"))
        }
    }
}

async fn resolve(state: &HttpState, token: &str) -> Result<User, Error> {
    let user_id = state
        .tokens
        .verify(token)
        .await
        .map_err(map_token_error)?
        .ok_or_else(|| Error::unauthorized("invalid bearer token"))?;
    let user = state
        .users
        .find_by_id(&user_id)
        .await
        .map_err(map_user_repository_error)?;
    user.ok_or_else(|| {
        debug!(%user_id, "token resolved to a missing user");
        Error::unauthorized("invalid bearer token")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let token = token?;
            resolve(&state, &token).await.map(AuthenticatedUser)
        })
    }
}

//! Test helpers for inbound HTTP components.

use actix_web::http::header::{AUTHORIZATION, HeaderName};

use crate::domain::UserId;
use crate::domain::ports::{FIXTURE_TOKEN, FIXTURE_USER_ID};
use crate::inbound::http::state::HttpState;

/// Fixture-backed state; override individual ports with struct update syntax.
pub fn test_state() -> HttpState {
    HttpState::default()
}

/// `Authorization` header accepted by the fixture token verifier.
pub fn bearer() -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {FIXTURE_TOKEN}"))
}

/// The user that [`bearer`] resolves to.
pub fn fixture_user_id() -> UserId {
    UserId::new(FIXTURE_USER_ID).expect("fixture user id is a UUID")
}

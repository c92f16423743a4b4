//! The error every driving port returns.
//!
//! Services build these from port failures and validation problems; the
//! HTTP adapter in `inbound::http::error` turns the code into a status.
//! Construction captures the request [`TraceId`] when one is in scope.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::trace_id::TraceId;

/// Failure category, serialised in snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input or a broken business rule such as a past date.
    InvalidRequest,
    Unauthorized,
    /// The caller's role or relationship to the booking does not allow it.
    Forbidden,
    NotFound,
    /// Duplicate pricing, a booking already taken, a payment already made.
    Conflict,
    /// The database, gateway or storage could not be reached.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::ServiceUnavailable => "service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// JSON error envelope: `code`, `message`, optional `traceId` and `details`.
///
/// ```
/// use marketplace::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_field("address needs city, state and country", "address", "invalid_address");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.details().and_then(|d| d.get("field")), Some(&serde_json::json!("address")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "startDate must not be in the past")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Blank messages fall back to the code's generic wording.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Same code and trace id, generic message, no details.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            code: self.code,
            message: self.code.fallback_message().to_owned(),
            trace_id: self.trace_id.clone(),
            details: None,
        }
    }

    /// Invalid request pointing at one request field.
    pub fn invalid_field(message: impl Into<String>, field: &str, reason: &str) -> Self {
        Self::invalid_request(message).with_details(json!({
            "field": field,
            "code": reason,
        }))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests;

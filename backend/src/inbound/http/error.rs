//! Maps domain errors onto HTTP responses.
//!
//! The domain error stays transport agnostic. This adapter picks the status
//! code, copies the trace id into the `trace-id` header, and redacts internal
//! failures after logging them.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    error!(
        trace_id = err.trace_id().unwrap_or("-"),
        message = err.message(),
        details = ?err.details(),
        "Internal server error"
    );
    err.redacted()
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("request could not be processed")
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("taken"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&err), status);
    }

    async fn body_of(err: &Error) -> Error {
        let response = ResponseError::error_response(err);
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        serde_json::from_slice(&bytes).expect("error JSON deserialises")
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted_but_keep_trace_id() {
        let err = Error::internal("pool exhausted at db-3")
            .with_trace_id(TRACE_ID)
            .with_details(json!({"host": "db-3"}));

        let response = ResponseError::error_response(&err);
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace-id header is set")
            .to_str()
            .expect("header is ascii");
        assert_eq!(header, TRACE_ID);

        let payload = body_of(&err).await;
        assert_eq!(payload.code(), ErrorCode::InternalError);
        assert_eq!(payload.message(), "Internal server error");
        assert_eq!(payload.trace_id(), Some(TRACE_ID));
        assert!(payload.details().is_none());
    }

    #[actix_web::test]
    async fn client_errors_keep_details_and_omit_missing_trace_header() {
        let err = Error::invalid_request("bad")
            .with_details(json!({"field": "startDate", "code": "invalid_date"}));

        let response = ResponseError::error_response(&err);
        assert!(response.headers().get(TRACE_ID_HEADER).is_none());

        let payload = body_of(&err).await;
        assert_eq!(payload.message(), "bad");
        assert_eq!(
            payload.details(),
            Some(&json!({"field": "startDate", "code": "invalid_date"}))
        );
    }
}

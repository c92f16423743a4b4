//! Error envelope construction and trace capture.

use super::*;
use rstest::rstest;

#[rstest]
#[case::forbidden(ErrorCode::Forbidden, "forbidden")]
#[case::unavailable(ErrorCode::ServiceUnavailable, "service unavailable")]
fn blank_messages_use_the_code_wording(#[case] code: ErrorCode, #[case] expected: &str) {
    assert_eq!(Error::new(code, "  ").message(), expected);
}

#[tokio::test]
async fn construction_inside_a_request_captures_its_trace_id() {
    let trace_id = TraceId::generate();

    let error = TraceId::scope(trace_id, async { Error::conflict("booking taken") }).await;

    assert_eq!(error.trace_id(), Some(trace_id.to_string().as_str()));
}

#[test]
fn construction_outside_a_request_has_no_trace_id() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[test]
fn redaction_keeps_code_and_trace_id_only() {
    let error = Error::internal("pool exhausted on db-3")
        .with_trace_id("abc")
        .with_details(json!({"host": "db-3"}));

    let redacted = error.redacted();

    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), "Internal server error");
    assert_eq!(redacted.trace_id(), Some("abc"));
    assert!(redacted.details().is_none());
}

#[test]
fn envelope_is_camel_case_and_omits_empty_fields() {
    let error = Error::invalid_field("startDate is in the past", "startDate", "past_date")
        .with_trace_id("abc");

    let value = serde_json::to_value(&error).expect("error serialises");

    assert_eq!(
        value,
        json!({
            "code": "invalid_request",
            "message": "startDate is in the past",
            "traceId": "abc",
            "details": {"field": "startDate", "code": "past_date"}
        })
    );
    let bare = serde_json::to_value(Error::not_found("no booking")).expect("error serialises");
    assert_eq!(bare, json!({"code": "not_found", "message": "no booking"}));
}

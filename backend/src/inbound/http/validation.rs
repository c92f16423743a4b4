//! Shared request validation helpers for the HTTP adapter.
//!
//! Failures become `invalid_request` errors whose details name the field,
//! echo the rejected value, and carry a stable code.

use std::str::FromStr;

use chrono::NaiveDate;
use pagination::{PageParams, PageRequest};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    BookingStatus, BookingType, Error, NotificationKind, Role, ServiceRole, ServiceType, UserId,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    InvalidUuid,
    InvalidDate,
    InvalidPage,
    UnknownServiceType,
    UnknownBookingType,
    UnknownBookingStatus,
    UnknownNotificationKind,
    UnknownRole,
    UnknownServiceRole,
}

impl ValidationCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidPage => "invalid_page",
            Self::UnknownServiceType => "unknown_service_type",
            Self::UnknownBookingType => "unknown_booking_type",
            Self::UnknownBookingStatus => "unknown_booking_status",
            Self::UnknownNotificationKind => "unknown_notification_kind",
            Self::UnknownRole => "unknown_role",
            Self::UnknownServiceRole => "unknown_service_role",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }
}

pub(crate) fn invalid_field(
    field: FieldName,
    value: &str,
    code: ValidationCode,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.0,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        invalid_field(
            field,
            value,
            ValidationCode::InvalidUuid,
            format!("{} must be a valid UUID", field.0),
        )
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| {
        invalid_field(
            field,
            value,
            ValidationCode::InvalidUuid,
            format!("{} must be a valid UUID", field.0),
        )
    })
}

fn parse_enum<T: FromStr>(
    value: &str,
    field: FieldName,
    code: ValidationCode,
    expected: &str,
) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| invalid_field(field, value, code, format!("{} must be {expected}", field.0)))
}

pub(crate) fn parse_service_type(value: &str, field: FieldName) -> Result<ServiceType, Error> {
    parse_enum(
        value,
        field,
        ValidationCode::UnknownServiceType,
        "cleaning, plumbing or cooking",
    )
}

pub(crate) fn parse_booking_status(value: &str, field: FieldName) -> Result<BookingStatus, Error> {
    parse_enum(
        value,
        field,
        ValidationCode::UnknownBookingStatus,
        "open, in_progress, completed or canceled",
    )
}

/// Optional query filters: `None` and `Some("")` both mean "not set".
pub(crate) fn parse_optional<T>(
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, Error>,
) -> Result<Option<T>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse(raw).map(Some),
    }
}

pub(crate) fn parse_booking_type(value: &str, field: FieldName) -> Result<BookingType, Error> {
    parse_enum(
        value,
        field,
        ValidationCode::UnknownBookingType,
        "instant or scheduled",
    )
}

pub(crate) fn parse_notification_kind(
    value: &str,
    field: FieldName,
) -> Result<NotificationKind, Error> {
    parse_enum(
        value,
        field,
        ValidationCode::UnknownNotificationKind,
        "booking or payment",
    )
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    parse_enum(
        value,
        field,
        ValidationCode::UnknownRole,
        "regular, admin or admin_super",
    )
}

pub(crate) fn parse_service_role(value: &str, field: FieldName) -> Result<ServiceRole, Error> {
    parse_enum(
        value,
        field,
        ValidationCode::UnknownServiceRole,
        "service_provider, service_requester or service_both",
    )
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        invalid_field(
            field,
            value,
            ValidationCode::InvalidDate,
            format!("{} must use YYYY-MM-DD", field.0),
        )
    })
}

/// Validate `page`/`size` query parameters.
pub(crate) fn page_request(params: PageParams) -> Result<PageRequest, Error> {
    PageRequest::try_from(params).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "page",
            "code": ValidationCode::InvalidPage.as_str(),
        }))
    })
}

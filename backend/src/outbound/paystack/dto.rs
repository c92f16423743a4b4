//! Paystack wire shapes.
//!
//! Every response is wrapped in the same envelope; `status == false` means
//! the gateway refused the request even when HTTP reported success.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(super) struct EnvelopeDto<T> {
    pub(super) status: bool,
    #[serde(default)]
    pub(super) message: String,
    pub(super) data: Option<T>,
}

#[derive(Debug, Serialize)]
pub(super) struct InitializeBodyDto<'a> {
    /// Minor units as a decimal string.
    pub(super) amount: String,
    pub(super) email: &'a str,
    pub(super) reference: &'a str,
    pub(super) currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) callback_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(super) struct RecipientBodyDto<'a> {
    #[serde(rename = "type")]
    pub(super) kind: &'static str,
    pub(super) name: &'a str,
    pub(super) account_number: &'a str,
    pub(super) bank_code: &'a str,
    pub(super) currency: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct InitializeDataDto {
    pub(super) access_code: String,
    pub(super) authorization_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusDataDto {
    pub(super) status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResolveDataDto {
    pub(super) account_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecipientDataDto {
    pub(super) recipient_code: String,
}

//! Reqwest-backed Paystack gateway.
//!
//! Transport failures and timeouts are retried under the configured
//! [`RetryPolicy`]. HTTP errors and refused envelopes are returned at once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use super::dto::{
    EnvelopeDto, InitializeBodyDto, InitializeDataDto, RecipientBodyDto, RecipientDataDto,
    ResolveDataDto, StatusDataDto,
};
use crate::domain::CURRENCY;
use crate::domain::ports::{
    InitializeTransaction, NewRecipient, PaymentGateway, PaymentGatewayError, TransactionInit,
};
use crate::outbound::http_support::body_preview;
use crate::outbound::retry::{RetryPolicy, retry};

/// Production API root.
pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co/";

const RECIPIENT_TYPE: &str = "nuban";

/// Paystack adapter authenticating with a secret key.
pub struct PaystackHttpGateway {
    client: Client,
    base_url: Url,
    secret_key: Zeroizing<String>,
    retry_policy: RetryPolicy,
}

impl PaystackHttpGateway {
    /// Build a gateway whose client gives up on a request after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        secret_key: Zeroizing<String>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            secret_key,
            retry_policy,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| PaymentGatewayError::rejected(format!("invalid endpoint {path}: {err}")))
    }

    /// `path` followed by one percent-encoded segment.
    fn endpoint_with_segment(&self, path: &str, segment: &str) -> Result<Url, PaymentGatewayError> {
        let mut url = self.endpoint(path)?;
        url.path_segments_mut()
            .map_err(|()| PaymentGatewayError::rejected("base URL cannot carry a path"))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation_name: &'static str,
        request: impl Fn(&Client) -> RequestBuilder,
    ) -> Result<T, PaymentGatewayError> {
        let request = &request;
        let this = self;
        retry(
            &self.retry_policy,
            operation_name,
            move || async move {
                let response = request(&this.client)
                    .bearer_auth(this.secret_key.as_str())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await
                    .map_err(map_transport_error)?;
                let status = response.status();
                let body = response.bytes().await.map_err(map_transport_error)?;
                if !status.is_success() {
                    return Err(map_status_error(status, body.as_ref()));
                }
                decode_envelope(body.as_ref())
            },
            PaymentGatewayError::is_retryable,
        )
        .await
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, PaymentGatewayError> {
    let envelope: EnvelopeDto<T> = serde_json::from_slice(body).map_err(|err| {
        PaymentGatewayError::decode(format!("invalid Paystack JSON payload: {err}"))
    })?;
    if !envelope.status {
        return Err(PaymentGatewayError::rejected(envelope.message));
    }
    envelope
        .data
        .ok_or_else(|| PaymentGatewayError::decode("Paystack response has no data"))
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    if error.is_timeout() {
        PaymentGatewayError::timeout(error.to_string())
    } else {
        PaymentGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };
    match status {
        StatusCode::TOO_MANY_REQUESTS => PaymentGatewayError::rate_limited(message),
        _ => PaymentGatewayError::rejected(message),
    }
}

#[async_trait]
impl PaymentGateway for PaystackHttpGateway {
    async fn initialize_transaction(
        &self,
        request: &InitializeTransaction,
    ) -> Result<TransactionInit, PaymentGatewayError> {
        let url = self.endpoint("transaction/initialize")?;
        let body = InitializeBodyDto {
            amount: request.amount_kobo.to_string(),
            email: &request.email,
            reference: &request.reference,
            currency: &request.currency,
            callback_url: request.callback_url.as_deref(),
        };
        let data: InitializeDataDto = self
            .call("paystack.initialize", |client| {
                client.post(url.clone()).json(&body)
            })
            .await?;
        Ok(TransactionInit {
            access_code: data.access_code,
            authorization_url: data.authorization_url,
        })
    }

    async fn verify_transaction(&self, reference: &str) -> Result<String, PaymentGatewayError> {
        let url = self.endpoint_with_segment("transaction/verify/", reference)?;
        let data: StatusDataDto = self
            .call("paystack.verify_transaction", |client| client.get(url.clone()))
            .await?;
        Ok(data.status)
    }

    async fn verify_transfer(&self, reference: &str) -> Result<String, PaymentGatewayError> {
        let url = self.endpoint_with_segment("transfer/verify/", reference)?;
        let data: StatusDataDto = self
            .call("paystack.verify_transfer", |client| client.get(url.clone()))
            .await?;
        Ok(data.status)
    }

    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<String, PaymentGatewayError> {
        let url = self.endpoint("bank/resolve")?;
        let data: ResolveDataDto = self
            .call("paystack.resolve_account", |client| {
                client
                    .get(url.clone())
                    .query(&[("account_number", account_number), ("bank_code", bank_code)])
            })
            .await?;
        Ok(data.account_name)
    }

    async fn create_recipient(&self, recipient: &NewRecipient) -> Result<String, PaymentGatewayError> {
        let url = self.endpoint("transferrecipient")?;
        let body = RecipientBodyDto {
            kind: RECIPIENT_TYPE,
            name: &recipient.name,
            account_number: &recipient.account_number,
            bank_code: &recipient.bank_code,
            currency: CURRENCY,
        };
        let data: RecipientDataDto = self
            .call("paystack.create_recipient", |client| {
                client.post(url.clone()).json(&body)
            })
            .await?;
        Ok(data.recipient_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn gateway() -> PaystackHttpGateway {
        PaystackHttpGateway::new(
            Url::parse("https://paystack.invalid/v1").expect("valid url"),
            Zeroizing::new("sk_test".to_owned()),
            Duration::from_secs(1),
            RetryPolicy::default(),
        )
        .expect("client builds")
    }

    #[rstest]
    fn endpoints_join_under_the_base_path(gateway: PaystackHttpGateway) {
        let url = gateway.endpoint("bank/resolve").expect("joins");
        assert_eq!(url.as_str(), "https://paystack.invalid/v1/bank/resolve");
    }

    #[rstest]
    fn references_are_a_single_escaped_segment(gateway: PaystackHttpGateway) {
        let url = gateway
            .endpoint_with_segment("transaction/verify/", "ref/../x y")
            .expect("joins");
        assert_eq!(
            url.as_str(),
            "https://paystack.invalid/v1/transaction/verify/ref%2F..%2Fx%20y"
        );
    }

    #[rstest]
    fn accepted_envelopes_yield_their_data() {
        let body = br#"{"status":true,"message":"Authorization URL created","data":{"access_code":"ac_1","authorization_url":"https://checkout.paystack.com/ac_1","reference":"r"}}"#;
        let data: InitializeDataDto = decode_envelope(body).expect("decodes");
        assert_eq!(data.access_code, "ac_1");
    }

    #[rstest]
    fn refused_envelopes_are_rejections() {
        let body = br#"{"status":false,"message":"Invalid key"}"#;
        let error = decode_envelope::<StatusDataDto>(body).expect_err("refused");
        assert!(matches!(error, PaymentGatewayError::Rejected { .. }));
        assert!(error.message().contains("Invalid key"));
    }

    #[rstest]
    #[case::garbage(b"<html>".as_slice())]
    #[case::missing_data(br#"{"status":true,"message":"ok"}"#.as_slice())]
    fn undecodable_bodies_are_decode_errors(#[case] body: &[u8]) {
        let error = decode_envelope::<StatusDataDto>(body).expect_err("undecodable");
        assert!(matches!(error, PaymentGatewayError::Decode { .. }));
    }

    #[rstest]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    #[case::server_error(StatusCode::BAD_GATEWAY, false)]
    fn status_errors_are_never_retried(#[case] status: StatusCode, #[case] rate_limited: bool) {
        let error = map_status_error(status, b"{\"message\":\"nope\"}");
        assert_eq!(matches!(error, PaymentGatewayError::RateLimited { .. }), rate_limited);
        assert!(!error.is_retryable());
    }

    #[rstest]
    fn recipient_bodies_use_the_gateway_field_names() {
        let body = RecipientBodyDto {
            kind: RECIPIENT_TYPE,
            name: "Ada Obi",
            account_number: "0123456789",
            bank_code: "058",
            currency: CURRENCY,
        };
        let json = serde_json::to_value(&body).expect("serialises");
        assert_eq!(json["type"], "nuban");
        assert_eq!(json["currency"], "NGN");
    }
}

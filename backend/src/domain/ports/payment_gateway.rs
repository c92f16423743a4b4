//! Driven port for the external payment gateway.
//!
//! The domain owns the request and response shapes; the adapter converts
//! them to the gateway's wire format and handles authentication.

use async_trait::async_trait;

use super::define_port_error;

/// Start a hosted checkout for one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeTransaction {
    /// Payer email shown on the checkout page.
    pub email: String,
    /// Amount in minor units.
    pub amount_kobo: i64,
    pub currency: String,
    /// Our payment reference; the gateway echoes it back on verification.
    pub reference: String,
    pub callback_url: Option<String>,
}

/// Checkout handles returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInit {
    pub access_code: String,
    pub authorization_url: String,
}

/// Bank account to register for payouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipient {
    pub name: String,
    pub account_number: String,
    pub bank_code: String,
}

define_port_error! {
    /// Errors surfaced while calling the payment gateway.
    pub enum PaymentGatewayError {
        /// Network transport failed before receiving a response.
        Transport => "payment gateway transport failed: {message}",
        /// The gateway did not answer in time.
        Timeout => "payment gateway timeout: {message}",
        /// The gateway rate-limited the request.
        RateLimited => "payment gateway rate limited request: {message}",
        /// The gateway rejected the request.
        Rejected => "payment gateway rejected request: {message}",
        /// The response could not be decoded.
        Decode => "payment gateway response decode failed: {message}",
    }
}

impl PaymentGatewayError {
    /// Whether retrying the same request may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session.
    async fn initialize_transaction(
        &self,
        request: &InitializeTransaction,
    ) -> Result<TransactionInit, PaymentGatewayError>;

    /// Raw status of a checkout, such as `success` or `abandoned`.
    async fn verify_transaction(&self, reference: &str) -> Result<String, PaymentGatewayError>;

    /// Raw status of a payout transfer.
    async fn verify_transfer(&self, reference: &str) -> Result<String, PaymentGatewayError>;

    /// Account holder name for a bank account.
    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<String, PaymentGatewayError>;

    /// Register a payout recipient, returning its recipient code.
    async fn create_recipient(&self, recipient: &NewRecipient) -> Result<String, PaymentGatewayError>;
}

/// Access code handed out by [`FixturePaymentGateway`].
pub const FIXTURE_ACCESS_CODE: &str = "fixture-access-code";

/// Fixture gateway where every transaction succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn initialize_transaction(
        &self,
        request: &InitializeTransaction,
    ) -> Result<TransactionInit, PaymentGatewayError> {
        Ok(TransactionInit {
            access_code: FIXTURE_ACCESS_CODE.to_owned(),
            authorization_url: format!("https://checkout.invalid/{}", request.reference),
        })
    }

    async fn verify_transaction(&self, _reference: &str) -> Result<String, PaymentGatewayError> {
        Ok("success".to_owned())
    }

    async fn verify_transfer(&self, _reference: &str) -> Result<String, PaymentGatewayError> {
        Ok("success".to_owned())
    }

    async fn resolve_account(
        &self,
        _account_number: &str,
        _bank_code: &str,
    ) -> Result<String, PaymentGatewayError> {
        Ok("Fixture Account".to_owned())
    }

    async fn create_recipient(&self, _recipient: &NewRecipient) -> Result<String, PaymentGatewayError> {
        Ok("RCP_fixture".to_owned())
    }
}

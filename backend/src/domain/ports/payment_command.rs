//! Driving port for payment initialization, verification, wallets, and
//! payout accounts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, PayoutRecipient, User};

use super::FIXTURE_ACCESS_CODE;

/// Whether an initialize call opened a new checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeOutcome {
    /// A new pending payment was created.
    Created,
    /// A pending payment already existed and its access code was reused.
    Processing,
}

/// Checkout handle returned to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializePaymentResponse {
    pub access_code: String,
    pub reference: String,
    pub outcome: InitializeOutcome,
}

/// Derived wallet view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletView {
    pub credits: f64,
    pub debits: f64,
    pub balance: f64,
}

/// Bank account submitted for payouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPayoutRequest {
    pub account_number: String,
    pub bank_code: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Open, or reuse, the checkout for a booking's credit payment.
    async fn initialize(
        &self,
        actor: &User,
        booking_id: Uuid,
        callback_url: Option<String>,
    ) -> Result<InitializePaymentResponse, Error>;

    /// Reconcile the actor's latest payment for a booking with the gateway
    /// and return the resulting status text.
    async fn verify(&self, actor: &User, booking_id: Uuid) -> Result<String, Error>;

    /// The actor's wallet.
    async fn wallet(&self, actor: &User) -> Result<WalletView, Error>;

    /// Resolve and register the actor's payout bank account.
    async fn register_payout_recipient(
        &self,
        actor: &User,
        request: RegisterPayoutRequest,
    ) -> Result<PayoutRecipient, Error>;
}

/// Fixture command that opens checkouts with a fixed access code.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentCommand;

#[async_trait]
impl PaymentCommand for FixturePaymentCommand {
    async fn initialize(
        &self,
        _actor: &User,
        _booking_id: Uuid,
        _callback_url: Option<String>,
    ) -> Result<InitializePaymentResponse, Error> {
        Ok(InitializePaymentResponse {
            access_code: FIXTURE_ACCESS_CODE.to_owned(),
            reference: Uuid::new_v4().to_string(),
            outcome: InitializeOutcome::Created,
        })
    }

    async fn verify(&self, _actor: &User, booking_id: Uuid) -> Result<String, Error> {
        Err(Error::not_found(format!("no payment for booking {booking_id}")))
    }

    async fn wallet(&self, _actor: &User) -> Result<WalletView, Error> {
        Ok(WalletView {
            credits: 0.0,
            debits: 0.0,
            balance: 0.0,
        })
    }

    async fn register_payout_recipient(
        &self,
        _actor: &User,
        _request: RegisterPayoutRequest,
    ) -> Result<PayoutRecipient, Error> {
        Err(Error::service_unavailable("payment gateway is not configured"))
    }
}

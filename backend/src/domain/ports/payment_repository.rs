//! Port for payments, gateway access codes, wallets, and payout recipients.
//!
//! Paired writes (payment plus access code, verification plus wallet credit,
//! cancellation plus access code removal) are single calls so adapters can
//! run them in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{LedgerDelta, NewNotification, Payment, PaymentType, PayoutRecipient, UserId, Wallet};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment repository adapters.
    pub enum PaymentRepositoryError {
        /// Repository connection could not be established.
        Connection => "payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "payment repository query failed: {message}",
    }
}

/// Wallet change applied alongside a verification.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletCredit {
    pub user_id: UserId,
    pub delta: LedgerDelta,
}

/// Writes that accompany marking a payment verified.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub payment_id: Uuid,
    pub wallet_credit: Option<WalletCredit>,
    pub notification: Option<NewNotification>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Most recent payment of `payment_type` for a booking.
    async fn find_latest(
        &self,
        booking_id: Uuid,
        payment_type: PaymentType,
    ) -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Gateway access code stored for a payment.
    async fn find_access_code(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<String>, PaymentRepositoryError>;

    /// Insert a pending payment together with its access code.
    async fn create_pending(
        &self,
        payment: &Payment,
        access_code: &str,
    ) -> Result<(), PaymentRepositoryError>;

    /// Move a pending payment to verified and apply the settlement writes.
    ///
    /// Returns `false` without side effects when the payment was no longer
    /// pending, so a settlement is applied at most once.
    async fn settle(
        &self,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> Result<bool, PaymentRepositoryError>;

    /// Delete the access code and mark the payment canceled.
    async fn cancel(&self, payment_id: Uuid, at: DateTime<Utc>) -> Result<(), PaymentRepositoryError>;

    /// Ledger counters for a user, if a wallet row exists.
    async fn find_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>, PaymentRepositoryError>;

    /// Insert or replace the payout recipient for a user.
    async fn upsert_recipient(
        &self,
        recipient: &PayoutRecipient,
    ) -> Result<(), PaymentRepositoryError>;
}

/// Fixture repository with no stored payments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentRepository;

#[async_trait]
impl PaymentRepository for FixturePaymentRepository {
    async fn find_latest(
        &self,
        _booking_id: Uuid,
        _payment_type: PaymentType,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn find_access_code(
        &self,
        _payment_id: Uuid,
    ) -> Result<Option<String>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn create_pending(
        &self,
        _payment: &Payment,
        _access_code: &str,
    ) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }

    async fn settle(
        &self,
        _settlement: &Settlement,
        _at: DateTime<Utc>,
    ) -> Result<bool, PaymentRepositoryError> {
        Ok(true)
    }

    async fn cancel(&self, _payment_id: Uuid, _at: DateTime<Utc>) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }

    async fn find_wallet(&self, _user_id: &UserId) -> Result<Option<Wallet>, PaymentRepositoryError> {
        Ok(None)
    }

    async fn upsert_recipient(
        &self,
        _recipient: &PayoutRecipient,
    ) -> Result<(), PaymentRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_has_no_wallets() {
        let wallet = FixturePaymentRepository
            .find_wallet(&UserId::random())
            .await
            .expect("fixture lookup succeeds");
        assert!(wallet.is_none());
    }

    #[test]
    fn connection_error_mentions_payments() {
        let err = PaymentRepositoryError::connection("timeout");
        assert_eq!(err.to_string(), "payment repository connection failed: timeout");
    }
}

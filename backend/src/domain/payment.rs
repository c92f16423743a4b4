//! Payments, wallet ledger arithmetic, and gateway status classification.
//!
//! A wallet stores two running counters. The balance is always derived as
//! `credits - debits` when read; it is never stored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;

/// Currency every gateway transaction is denominated in.
pub const CURRENCY: &str = "NGN";

/// Direction of money movement recorded by a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Requester pays into the platform.
    Credit,
    /// Platform pays a provider out.
    Debit,
    /// Money returned to a requester.
    Refund,
}

impl PaymentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Refund => "refund",
        }
    }

    /// Counter changes this payment type applies for `amount`.
    ///
    /// A credit raises both counters so the gross inflow is tracked apart
    /// from the net balance.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::PaymentType;
    ///
    /// let delta = PaymentType::Credit.ledger_delta(250.0);
    /// assert_eq!((delta.credits, delta.debits), (250.0, 250.0));
    /// let delta = PaymentType::Refund.ledger_delta(100.0);
    /// assert_eq!((delta.credits, delta.debits), (0.0, -100.0));
    /// ```
    pub fn ledger_delta(self, amount: f64) -> LedgerDelta {
        match self {
            Self::Credit => LedgerDelta {
                credits: amount,
                debits: amount,
            },
            Self::Debit => LedgerDelta {
                credits: 0.0,
                debits: amount,
            },
            Self::Refund => LedgerDelta {
                credits: 0.0,
                debits: -amount,
            },
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored payment field is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentValidationError {
    #[error("unknown payment type: {0}")]
    UnknownType(String),
    #[error("unknown payment status: {0}")]
    UnknownStatus(String),
}

impl FromStr for PaymentType {
    type Err = PaymentValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "refund" => Ok(Self::Refund),
            other => Err(PaymentValidationError::UnknownType(other.to_owned())),
        }
    }
}

/// Signed change to the wallet counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerDelta {
    pub credits: f64,
    pub debits: f64,
}

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Canceled,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "canceled" => Ok(Self::Canceled),
            other => Err(PaymentValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// One attempt to move money for a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub payment_type: PaymentType,
    pub booking_id: Option<Uuid>,
    pub amount: f64,
    /// Fresh per attempt and correlated with the gateway transaction.
    pub reference: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// A pending credit payment for `booking_id` with a new reference.
    pub fn pending_credit(booking_id: Uuid, amount: f64, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_type: PaymentType::Credit,
            booking_id: Some(booking_id),
            amount,
            reference: Uuid::new_v4().to_string(),
            status: PaymentStatus::Pending,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Convert a major-unit amount into the integer minor units the gateway
/// expects. Fractions of a kobo are truncated.
pub fn amount_in_kobo(amount: f64) -> i64 {
    (amount * 100.0) as i64
}

/// How a gateway status string affects a pending payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The money moved.
    Success,
    /// The attempt ended without moving money.
    Failed(String),
    /// Any other status; the caller may poll again.
    Unsettled(String),
}

impl GatewayOutcome {
    /// Classify a raw gateway status string.
    pub fn classify(status: &str) -> Self {
        match status {
            "success" => Self::Success,
            "abandoned" | "failed" | "reversed" => Self::Failed(status.to_owned()),
            other => Self::Unsettled(other.to_owned()),
        }
    }
}

/// Wallet read failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    /// The stored counters produce a negative balance.
    #[error("InvalidWalletBalance: credits {credits} minus debits {debits} is negative")]
    NegativeBalance { credits: f64, debits: f64 },
}

/// Ledger counters for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    pub user_id: UserId,
    pub credits: f64,
    pub debits: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// An empty wallet for a user with no ledger rows yet.
    pub fn empty(user_id: UserId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            credits: 0.0,
            debits: 0.0,
            created_at: at,
            updated_at: at,
        }
    }

    /// Derived balance; negative values are a data-integrity error.
    pub fn balance(&self) -> Result<f64, WalletError> {
        let balance = self.credits - self.debits;
        if balance < 0.0 {
            Err(WalletError::NegativeBalance {
                credits: self.credits,
                debits: self.debits,
            })
        } else {
            Ok(balance)
        }
    }

    /// Counters after applying `delta`.
    #[must_use]
    pub fn apply(mut self, delta: LedgerDelta, at: DateTime<Utc>) -> Self {
        self.credits += delta.credits;
        self.debits += delta.debits;
        self.updated_at = at;
        self
    }
}

/// A provider's registered bank account at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecipient {
    pub user_id: UserId,
    pub recipient_code: String,
    pub account_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn wallet() -> Wallet {
        Wallet::empty(UserId::random(), Utc::now())
    }

    #[rstest]
    #[case(PaymentType::Credit, 40.0, 40.0)]
    #[case(PaymentType::Debit, 0.0, 40.0)]
    #[case(PaymentType::Refund, 0.0, -40.0)]
    fn ledger_rules(#[case] kind: PaymentType, #[case] credits: f64, #[case] debits: f64) {
        assert_eq!(kind.ledger_delta(40.0), LedgerDelta { credits, debits });
    }

    #[rstest]
    fn credit_leaves_balance_unchanged(wallet: Wallet) {
        let at = Utc::now();
        let wallet = wallet.apply(PaymentType::Credit.ledger_delta(500.0), at);
        assert_eq!(wallet.credits, 500.0);
        assert_eq!(wallet.debits, 500.0);
        assert_eq!(wallet.balance(), Ok(0.0));
    }

    #[rstest]
    fn balance_is_credits_minus_debits(mut wallet: Wallet) {
        wallet.credits = 900.0;
        wallet.debits = 250.0;
        assert_eq!(wallet.balance(), Ok(650.0));
    }

    #[rstest]
    fn negative_balance_is_an_error(wallet: Wallet) {
        let wallet = wallet.apply(PaymentType::Debit.ledger_delta(10.0), Utc::now());
        assert_eq!(
            wallet.balance(),
            Err(WalletError::NegativeBalance {
                credits: 0.0,
                debits: 10.0
            })
        );
    }

    #[rstest]
    #[case("success", GatewayOutcome::Success)]
    #[case("abandoned", GatewayOutcome::Failed("abandoned".to_owned()))]
    #[case("failed", GatewayOutcome::Failed("failed".to_owned()))]
    #[case("reversed", GatewayOutcome::Failed("reversed".to_owned()))]
    #[case("ongoing", GatewayOutcome::Unsettled("ongoing".to_owned()))]
    fn classifies_gateway_status(#[case] raw: &str, #[case] expected: GatewayOutcome) {
        assert_eq!(GatewayOutcome::classify(raw), expected);
    }

    #[rstest]
    #[case(10_000.0, 1_000_000)]
    #[case(12.345, 1234)]
    fn kobo_conversion_truncates(#[case] amount: f64, #[case] kobo: i64) {
        assert_eq!(amount_in_kobo(amount), kobo);
    }

    #[rstest]
    fn pending_credit_gets_fresh_reference() {
        let booking = Uuid::new_v4();
        let first = Payment::pending_credit(booking, 10.0, Utc::now());
        let second = Payment::pending_credit(booking, 10.0, Utc::now());
        assert_ne!(first.reference, second.reference);
        assert_ne!(first.reference, booking.to_string());
        assert_eq!(first.status, PaymentStatus::Pending);
    }
}

//! Payment reconciliation service.
//!
//! Initialize opens at most one pending credit payment per booking and
//! reuses its access code on repeat calls. Verify asks the gateway for the
//! outcome and settles the payment and wallet once.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info};
use uuid::Uuid;

use super::booking_service::{booking_not_found, map_booking_repository_error};
use crate::domain::ports::{
    BookingRepository, InitializeOutcome, InitializePaymentResponse, InitializeTransaction,
    NewRecipient, PaymentCommand, PaymentGateway, PaymentGatewayError, PaymentRepository,
    PaymentRepositoryError, RegisterPayoutRequest, Settlement, WalletCredit, WalletView,
};
use crate::domain::{
    Booking, CURRENCY, Capability, Error, GatewayOutcome, NewNotification, Payment,
    PaymentStatus, PaymentType, PayoutRecipient, User, Wallet, amount_in_kobo, authorize,
    messages,
};

fn map_payment_repository_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("payment repository unavailable: {message}"))
        }
        PaymentRepositoryError::Query { message } => {
            Error::internal(format!("payment repository error: {message}"))
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    match error {
        PaymentGatewayError::Transport { .. }
        | PaymentGatewayError::Timeout { .. }
        | PaymentGatewayError::RateLimited { .. } => {
            Error::service_unavailable(format!("payment gateway unavailable: {error}"))
        }
        PaymentGatewayError::Rejected { .. } | PaymentGatewayError::Decode { .. } => {
            Error::internal(error.to_string())
        }
    }
}

fn is_account_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit())
}

/// Payment service implementing [`PaymentCommand`].
pub struct PaymentService<B, P> {
    booking_repo: Arc<B>,
    payment_repo: Arc<P>,
    gateway: Arc<dyn PaymentGateway>,
    clock: Arc<dyn Clock>,
}

impl<B, P> PaymentService<B, P> {
    pub fn new(
        booking_repo: Arc<B>,
        payment_repo: Arc<P>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            booking_repo,
            payment_repo,
            gateway,
            clock,
        }
    }
}

impl<B, P> PaymentService<B, P>
where
    B: BookingRepository,
    P: PaymentRepository,
{
    async fn load_booking(&self, booking_id: Uuid) -> Result<Booking, Error> {
        self.booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(map_booking_repository_error)?
            .ok_or_else(|| booking_not_found(booking_id))
    }

    async fn latest(&self, booking_id: Uuid, payment_type: PaymentType) -> Result<Option<Payment>, Error> {
        self.payment_repo
            .find_latest(booking_id, payment_type)
            .await
            .map_err(map_payment_repository_error)
    }

    async fn reuse_pending(&self, payment: Payment) -> Result<InitializePaymentResponse, Error> {
        let access_code = self
            .payment_repo
            .find_access_code(payment.id)
            .await
            .map_err(map_payment_repository_error)?
            .ok_or_else(|| {
                Error::internal(format!("pending payment {} has no access code", payment.id))
            })?;
        Ok(InitializePaymentResponse {
            access_code,
            reference: payment.reference,
            outcome: InitializeOutcome::Processing,
        })
    }
}

#[async_trait]
impl<B, P> PaymentCommand for PaymentService<B, P>
where
    B: BookingRepository,
    P: PaymentRepository,
{
    async fn initialize(
        &self,
        actor: &User,
        booking_id: Uuid,
        callback_url: Option<String>,
    ) -> Result<InitializePaymentResponse, Error> {
        let booking = self.load_booking(booking_id).await?;
        if !booking.is_requester(&actor.id) {
            return Err(Error::forbidden("only the requester may pay for a booking"));
        }

        match self.latest(booking_id, PaymentType::Credit).await? {
            Some(payment) if payment.status == PaymentStatus::Pending => {
                return self.reuse_pending(payment).await;
            }
            Some(payment) if payment.status == PaymentStatus::Verified => {
                return Err(Error::conflict(format!(
                    "booking {booking_id} is already paid"
                )));
            }
            _ => {}
        }

        let payment = Payment::pending_credit(booking_id, booking.total_price(), self.clock.utc());
        let init = self
            .gateway
            .initialize_transaction(&InitializeTransaction {
                email: actor.email.clone(),
                amount_kobo: amount_in_kobo(payment.amount),
                currency: CURRENCY.to_owned(),
                reference: payment.reference.clone(),
                callback_url,
            })
            .await
            .map_err(map_gateway_error)?;

        self.payment_repo
            .create_pending(&payment, &init.access_code)
            .await
            .map_err(map_payment_repository_error)?;
        info!(%booking_id, payment_id = %payment.id, "payment initialized");

        Ok(InitializePaymentResponse {
            access_code: init.access_code,
            reference: payment.reference,
            outcome: InitializeOutcome::Created,
        })
    }

    async fn verify(&self, actor: &User, booking_id: Uuid) -> Result<String, Error> {
        let booking = self.load_booking(booking_id).await?;
        let payment_type = if booking.is_requester(&actor.id) {
            PaymentType::Credit
        } else if booking.is_provider(&actor.id) {
            PaymentType::Debit
        } else {
            return Err(Error::forbidden("booking belongs to other users"));
        };

        let payment = self
            .latest(booking_id, payment_type)
            .await?
            .ok_or_else(|| Error::not_found(format!("no payment found for booking {booking_id}")))?;
        if payment.status != PaymentStatus::Pending {
            return Ok(payment.status.as_str().to_owned());
        }

        let status = match payment_type {
            PaymentType::Credit => self.gateway.verify_transaction(&payment.reference).await,
            _ => self.gateway.verify_transfer(&payment.reference).await,
        }
        .map_err(map_gateway_error)?;

        let now = self.clock.utc();
        match GatewayOutcome::classify(&status) {
            GatewayOutcome::Success => {
                let wallet_credit = (payment_type == PaymentType::Credit).then(|| WalletCredit {
                    user_id: actor.id.clone(),
                    delta: PaymentType::Credit.ledger_delta(booking.total_price()),
                });
                let settlement = Settlement {
                    payment_id: payment.id,
                    wallet_credit,
                    notification: Some(NewNotification::payment(
                        actor.id.clone(),
                        Some(booking_id),
                        messages::PAYMENT_VERIFIED,
                    )),
                };
                let settled = self
                    .payment_repo
                    .settle(&settlement, now)
                    .await
                    .map_err(map_payment_repository_error)?;
                if settled {
                    info!(%booking_id, payment_id = %payment.id, "payment verified");
                } else {
                    info!(%booking_id, payment_id = %payment.id, "payment already settled");
                }
                Ok(PaymentStatus::Verified.as_str().to_owned())
            }
            GatewayOutcome::Failed(status) => {
                self.payment_repo
                    .cancel(payment.id, now)
                    .await
                    .map_err(map_payment_repository_error)?;
                info!(%booking_id, payment_id = %payment.id, %status, "payment canceled");
                Ok(status)
            }
            GatewayOutcome::Unsettled(status) => Ok(status),
        }
    }

    async fn wallet(&self, actor: &User) -> Result<WalletView, Error> {
        let wallet = self
            .payment_repo
            .find_wallet(&actor.id)
            .await
            .map_err(map_payment_repository_error)?
            .unwrap_or_else(|| Wallet::empty(actor.id.clone(), self.clock.utc()));
        let balance = wallet.balance().map_err(|err| {
            error!(user_id = %actor.id, error = %err, "wallet balance is negative");
            Error::internal(err.to_string())
        })?;
        Ok(WalletView {
            credits: wallet.credits,
            debits: wallet.debits,
            balance,
        })
    }

    async fn register_payout_recipient(
        &self,
        actor: &User,
        request: RegisterPayoutRequest,
    ) -> Result<PayoutRecipient, Error> {
        authorize(
            actor,
            Capability::ProvideServices,
            "only providers may register payout accounts",
        )?;
        if !is_account_digits(&request.account_number) {
            return Err(Error::invalid_request("accountNumber must contain only digits")
                .with_details(serde_json::json!({
                    "field": "accountNumber",
                    "value": request.account_number,
                    "code": "invalid_account_number",
                })));
        }
        if request.bank_code.trim().is_empty() {
            return Err(Error::invalid_request("bankCode must not be empty"));
        }

        let account_name = self
            .gateway
            .resolve_account(&request.account_number, &request.bank_code)
            .await
            .map_err(map_gateway_error)?;
        let recipient_code = self
            .gateway
            .create_recipient(&NewRecipient {
                name: account_name.clone(),
                account_number: request.account_number,
                bank_code: request.bank_code,
            })
            .await
            .map_err(map_gateway_error)?;

        let now = self.clock.utc();
        let recipient = PayoutRecipient {
            user_id: actor.id.clone(),
            recipient_code,
            account_name,
            created_at: now,
            updated_at: now,
        };
        self.payment_repo
            .upsert_recipient(&recipient)
            .await
            .map_err(map_payment_repository_error)?;
        info!(user_id = %actor.id, "payout recipient registered");
        Ok(recipient)
    }
}

#[cfg(test)]
#[path = "payment_service_tests.rs"]
mod tests;

//! Payment, wallet and payout HTTP handlers.
//!
//! ```text
//! POST /api/v1/payments/initialize
//! POST /api/v1/payments/verify
//! GET  /api/v1/wallet
//! PUT  /api/v1/payout-recipient
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    InitializeOutcome, InitializePaymentResponse, RegisterPayoutRequest, WalletView,
};
use crate::domain::{CURRENCY, Error, PayoutRecipient};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request body for opening a checkout.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentBody {
    #[schema(format = "uuid")]
    pub booking_id: String,
    /// Where the gateway redirects after checkout.
    pub callback_url: Option<String>,
}

/// Checkout handle.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponseBody {
    pub access_code: String,
    pub reference: String,
    /// `created` for a new checkout, `processing` when one was already open.
    #[schema(example = "created")]
    pub status: String,
}

impl From<InitializePaymentResponse> for InitializePaymentResponseBody {
    fn from(value: InitializePaymentResponse) -> Self {
        let status = match value.outcome {
            InitializeOutcome::Created => "created",
            InitializeOutcome::Processing => "processing",
        };
        Self {
            access_code: value.access_code,
            reference: value.reference,
            status: status.to_owned(),
        }
    }
}

/// Request body for checking a payment.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentBody {
    #[schema(format = "uuid")]
    pub booking_id: String,
}

/// Payment status after verification.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyPaymentResponseBody {
    #[schema(example = "verified")]
    pub status: String,
}

/// Wallet counters and derived balance.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletResponse {
    pub credits: f64,
    pub debits: f64,
    pub balance: f64,
    #[schema(example = "NGN")]
    pub currency: String,
}

impl From<WalletView> for WalletResponse {
    fn from(value: WalletView) -> Self {
        Self {
            credits: value.credits,
            debits: value.debits,
            balance: value.balance,
            currency: CURRENCY.to_owned(),
        }
    }
}

/// Bank account to receive payouts.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecipientBody {
    #[schema(example = "0123456789")]
    pub account_number: String,
    #[schema(example = "058")]
    pub bank_code: String,
}

/// Registered payout recipient.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecipientResponse {
    pub recipient_code: String,
    pub account_name: String,
    pub updated_at: DateTime<Utc>,
}

impl From<PayoutRecipient> for PayoutRecipientResponse {
    fn from(value: PayoutRecipient) -> Self {
        Self {
            recipient_code: value.recipient_code,
            account_name: value.account_name,
            updated_at: value.updated_at,
        }
    }
}

/// Open a checkout for a booking, or return the one already open.
#[utoipa::path(
    post,
    path = "/api/v1/payments/initialize",
    request_body = InitializePaymentBody,
    responses(
        (status = 200, description = "Checkout opened", body = InitializePaymentResponseBody),
        (status = 202, description = "Checkout already open", body = InitializePaymentResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the requester", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 409, description = "Booking already paid", body = Error),
        (status = 503, description = "Payment gateway unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "initializePayment",
    security(("BearerToken" = []))
)]
#[post("/payments/initialize")]
pub async fn initialize_payment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<InitializePaymentBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let booking_id = parse_uuid(&body.booking_id, FieldName::new("bookingId"))?;
    let response = state
        .payments
        .initialize(user.user(), booking_id, body.callback_url)
        .await?;
    let mut builder = match response.outcome {
        InitializeOutcome::Created => HttpResponse::Ok(),
        InitializeOutcome::Processing => HttpResponse::Accepted(),
    };
    Ok(builder.json(InitializePaymentResponseBody::from(response)))
}

/// Ask the gateway for the latest outcome of the caller's payment.
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = VerifyPaymentBody,
    responses(
        (status = 200, description = "Current payment status", body = VerifyPaymentResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "No payment found", body = Error),
        (status = 503, description = "Payment gateway unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "verifyPayment",
    security(("BearerToken" = []))
)]
#[post("/payments/verify")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<VerifyPaymentBody>,
) -> ApiResult<web::Json<VerifyPaymentResponseBody>> {
    let booking_id = parse_uuid(&payload.booking_id, FieldName::new("bookingId"))?;
    let status = state.payments.verify(user.user(), booking_id).await?;
    Ok(web::Json(VerifyPaymentResponseBody { status }))
}

/// The caller's wallet.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses(
        (status = 200, description = "Wallet", body = WalletResponse),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["payments"],
    operation_id = "getWallet",
    security(("BearerToken" = []))
)]
#[get("/wallet")]
pub async fn get_wallet(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<WalletResponse>> {
    let wallet = state.payments.wallet(user.user()).await?;
    Ok(web::Json(wallet.into()))
}

/// Register or replace the caller's payout bank account.
#[utoipa::path(
    put,
    path = "/api/v1/payout-recipient",
    request_body = PayoutRecipientBody,
    responses(
        (status = 200, description = "Recipient registered", body = PayoutRecipientResponse),
        (status = 400, description = "Invalid account details", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Requesters cannot receive payouts", body = Error),
        (status = 503, description = "Payment gateway unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "registerPayoutRecipient",
    security(("BearerToken" = []))
)]
#[put("/payout-recipient")]
pub async fn register_payout_recipient(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<PayoutRecipientBody>,
) -> ApiResult<web::Json<PayoutRecipientResponse>> {
    let body = payload.into_inner();
    let recipient = state
        .payments
        .register_payout_recipient(
            user.user(),
            RegisterPayoutRequest {
                account_number: body.account_number,
                bank_code: body.bank_code,
            },
        )
        .await?;
    Ok(web::Json(recipient.into()))
}

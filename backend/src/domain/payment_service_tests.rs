//! Tests for payment initialization, verification, and wallets.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    FIXTURE_ACCESS_CODE, MockBookingRepository, MockPaymentGateway, MockPaymentRepository,
    TransactionInit,
};
use crate::domain::service_test_support::{
    booking, fixture_clock, fixture_timestamp, provider, requester,
};
use crate::domain::{BookingStatus, ErrorCode, UserId};

struct Mocks {
    bookings: MockBookingRepository,
    payments: MockPaymentRepository,
    gateway: MockPaymentGateway,
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        bookings: MockBookingRepository::new(),
        payments: MockPaymentRepository::new(),
        gateway: MockPaymentGateway::new(),
    }
}

fn service(mocks: Mocks) -> PaymentService<MockBookingRepository, MockPaymentRepository> {
    PaymentService::new(
        Arc::new(mocks.bookings),
        Arc::new(mocks.payments),
        Arc::new(mocks.gateway),
        fixture_clock(),
    )
}

fn expect_booking(mocks: &mut Mocks, stored: &Booking) {
    let found = stored.clone();
    mocks
        .bookings
        .expect_find_by_id()
        .with(eq(stored.id()))
        .return_once(move |_| Ok(Some(found)));
}

fn payment(booking_id: Uuid, payment_type: PaymentType, status: PaymentStatus) -> Payment {
    Payment {
        payment_type,
        status,
        ..Payment::pending_credit(booking_id, 10_000.0, fixture_timestamp())
    }
}

#[rstest]
#[tokio::test]
async fn initialize_opens_checkout_in_kobo(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    mocks
        .payments
        .expect_find_latest()
        .with(eq(booking_id), eq(PaymentType::Credit))
        .return_once(|_, _| Ok(None));
    let email = owner.email.clone();
    mocks
        .gateway
        .expect_initialize_transaction()
        .withf(move |request| {
            request.amount_kobo == 1_000_000 && request.currency == "NGN" && request.email == email
        })
        .times(1)
        .return_once(|request| {
            Ok(TransactionInit {
                access_code: FIXTURE_ACCESS_CODE.to_owned(),
                authorization_url: format!("https://checkout.invalid/{}", request.reference),
            })
        });
    mocks
        .payments
        .expect_create_pending()
        .withf(|payment, code| {
            payment.status == PaymentStatus::Pending && code == FIXTURE_ACCESS_CODE
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let response = service(mocks)
        .initialize(&owner, booking_id, None)
        .await
        .expect("initialized");

    assert_eq!(response.outcome, InitializeOutcome::Created);
    assert_eq!(response.access_code, FIXTURE_ACCESS_CODE);
}

#[rstest]
#[tokio::test]
async fn initialize_twice_reuses_pending_access_code(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    let pending = payment(booking_id, PaymentType::Credit, PaymentStatus::Pending);
    let reference = pending.reference.clone();
    mocks
        .payments
        .expect_find_latest()
        .return_once(move |_, _| Ok(Some(pending)));
    mocks
        .payments
        .expect_find_access_code()
        .return_once(|_| Ok(Some("existing-code".to_owned())));
    mocks.gateway.expect_initialize_transaction().times(0);
    mocks.payments.expect_create_pending().times(0);

    let response = service(mocks)
        .initialize(&owner, booking_id, None)
        .await
        .expect("reused");

    assert_eq!(response.outcome, InitializeOutcome::Processing);
    assert_eq!(response.access_code, "existing-code");
    assert_eq!(response.reference, reference);
}

#[rstest]
#[tokio::test]
async fn initialize_after_verification_conflicts(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    mocks.payments.expect_find_latest().return_once(move |_, _| {
        Ok(Some(payment(booking_id, PaymentType::Credit, PaymentStatus::Verified)))
    });
    mocks.gateway.expect_initialize_transaction().times(0);

    let error = service(mocks)
        .initialize(&owner, booking_id, None)
        .await
        .expect_err("already paid");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn only_requester_initializes(mut mocks: Mocks) {
    let stored = booking(&UserId::random(), BookingStatus::Open, None);
    expect_booking(&mut mocks, &stored);
    mocks.payments.expect_find_latest().times(0);

    let error = service(mocks)
        .initialize(&requester(), stored.id(), None)
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn gateway_timeouts_are_service_unavailable(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    expect_booking(&mut mocks, &stored);
    mocks.payments.expect_find_latest().return_once(|_, _| Ok(None));
    mocks
        .gateway
        .expect_initialize_transaction()
        .return_once(|_| Err(PaymentGatewayError::timeout("10s elapsed")));
    mocks.payments.expect_create_pending().times(0);

    let error = service(mocks)
        .initialize(&owner, stored.id(), None)
        .await
        .expect_err("gateway down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn verified_payment_short_circuits(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    mocks.payments.expect_find_latest().return_once(move |_, _| {
        Ok(Some(payment(booking_id, PaymentType::Credit, PaymentStatus::Verified)))
    });
    mocks.gateway.expect_verify_transaction().times(0);
    mocks.payments.expect_settle().times(0);

    let status = service(mocks)
        .verify(&owner, booking_id)
        .await
        .expect("verified");

    assert_eq!(status, "verified");
}

#[rstest]
#[tokio::test]
async fn successful_credit_settles_and_credits_requester(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    let pending = payment(booking_id, PaymentType::Credit, PaymentStatus::Pending);
    let payment_id = pending.id;
    mocks
        .payments
        .expect_find_latest()
        .return_once(move |_, _| Ok(Some(pending)));
    mocks
        .gateway
        .expect_verify_transaction()
        .times(1)
        .return_once(|_| Ok("success".to_owned()));
    let owner_id = owner.id.clone();
    mocks
        .payments
        .expect_settle()
        .withf(move |settlement, _| {
            settlement.payment_id == payment_id
                && settlement.wallet_credit
                    == Some(WalletCredit {
                        user_id: owner_id.clone(),
                        delta: PaymentType::Credit.ledger_delta(10_000.0),
                    })
        })
        .times(1)
        .return_once(|_, _| Ok(true));

    let status = service(mocks)
        .verify(&owner, booking_id)
        .await
        .expect("verified");

    assert_eq!(status, "verified");
}

#[rstest]
#[tokio::test]
async fn provider_verifies_transfer_without_wallet_credit(mut mocks: Mocks) {
    let assigned = provider();
    let stored = booking(&UserId::random(), BookingStatus::Completed, Some(&assigned.id));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    mocks
        .payments
        .expect_find_latest()
        .with(eq(booking_id), eq(PaymentType::Debit))
        .return_once(move |_, _| {
            Ok(Some(payment(booking_id, PaymentType::Debit, PaymentStatus::Pending)))
        });
    mocks.gateway.expect_verify_transaction().times(0);
    mocks
        .gateway
        .expect_verify_transfer()
        .times(1)
        .return_once(|_| Ok("success".to_owned()));
    mocks
        .payments
        .expect_settle()
        .withf(|settlement, _| settlement.wallet_credit.is_none())
        .times(1)
        .return_once(|_, _| Ok(true));

    service(mocks)
        .verify(&assigned, booking_id)
        .await
        .expect("verified");
}

#[rstest]
#[case("abandoned")]
#[case("failed")]
#[case("reversed")]
#[tokio::test]
async fn failed_payments_are_canceled(mut mocks: Mocks, #[case] gateway_status: &'static str) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    let pending = payment(booking_id, PaymentType::Credit, PaymentStatus::Pending);
    let payment_id = pending.id;
    mocks
        .payments
        .expect_find_latest()
        .return_once(move |_, _| Ok(Some(pending)));
    mocks
        .gateway
        .expect_verify_transaction()
        .return_once(move |_| Ok(gateway_status.to_owned()));
    mocks
        .payments
        .expect_cancel()
        .with(eq(payment_id), mockall::predicate::always())
        .times(1)
        .return_once(|_, _| Ok(()));
    mocks.payments.expect_settle().times(0);

    let status = service(mocks)
        .verify(&owner, booking_id)
        .await
        .expect("status returned");

    assert_eq!(status, gateway_status);
}

#[rstest]
#[tokio::test]
async fn unsettled_status_passes_through(mut mocks: Mocks) {
    let owner = requester();
    let stored = booking(&owner.id, BookingStatus::Completed, Some(&UserId::random()));
    let booking_id = stored.id();
    expect_booking(&mut mocks, &stored);
    mocks.payments.expect_find_latest().return_once(move |_, _| {
        Ok(Some(payment(booking_id, PaymentType::Credit, PaymentStatus::Pending)))
    });
    mocks
        .gateway
        .expect_verify_transaction()
        .return_once(|_| Ok("ongoing".to_owned()));
    mocks.payments.expect_cancel().times(0);
    mocks.payments.expect_settle().times(0);

    let status = service(mocks)
        .verify(&owner, booking_id)
        .await
        .expect("status returned");

    assert_eq!(status, "ongoing");
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_verify(mut mocks: Mocks) {
    let stored = booking(&UserId::random(), BookingStatus::Open, None);
    expect_booking(&mut mocks, &stored);
    mocks.payments.expect_find_latest().times(0);

    let error = service(mocks)
        .verify(&requester(), stored.id())
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn missing_wallet_reads_as_empty(mut mocks: Mocks) {
    mocks.payments.expect_find_wallet().return_once(|_| Ok(None));

    let view = service(mocks).wallet(&requester()).await.expect("wallet");

    assert_eq!(view.balance, 0.0);
}

#[rstest]
#[tokio::test]
async fn negative_wallet_balance_is_an_internal_error(mut mocks: Mocks) {
    let actor = requester();
    let mut wallet = Wallet::empty(actor.id.clone(), fixture_timestamp());
    wallet.debits = 50.0;
    mocks
        .payments
        .expect_find_wallet()
        .return_once(move |_| Ok(Some(wallet)));

    let error = service(mocks).wallet(&actor).await.expect_err("negative");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert!(error.message().starts_with("InvalidWalletBalance"));
}

#[rstest]
#[tokio::test]
async fn payout_recipient_is_resolved_and_stored(mut mocks: Mocks) {
    let actor = provider();
    mocks
        .gateway
        .expect_resolve_account()
        .with(eq("0123456789"), eq("058"))
        .return_once(|_, _| Ok("ADA OBI".to_owned()));
    mocks
        .gateway
        .expect_create_recipient()
        .withf(|recipient| recipient.name == "ADA OBI")
        .return_once(|_| Ok("RCP_123".to_owned()));
    mocks
        .payments
        .expect_upsert_recipient()
        .times(1)
        .return_once(|_| Ok(()));

    let recipient = service(mocks)
        .register_payout_recipient(
            &actor,
            RegisterPayoutRequest {
                account_number: "0123456789".to_owned(),
                bank_code: "058".to_owned(),
            },
        )
        .await
        .expect("registered");

    assert_eq!(recipient.recipient_code, "RCP_123");
    assert_eq!(recipient.user_id, actor.id);
}

#[rstest]
#[tokio::test]
async fn payout_account_must_be_digits(mut mocks: Mocks) {
    mocks.gateway.expect_resolve_account().times(0);

    let error = service(mocks)
        .register_payout_recipient(
            &provider(),
            RegisterPayoutRequest {
                account_number: "01234x".to_owned(),
                bank_code: "058".to_owned(),
            },
        )
        .await
        .expect_err("invalid");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

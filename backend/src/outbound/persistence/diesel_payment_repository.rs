//! PostgreSQL-backed [`PaymentRepository`].
//!
//! Settlement is guarded by a conditional `pending -> verified` update. When
//! another request settled first the update matches nothing and the wallet
//! is left alone. Cancellation is guarded the same way, so a late failure
//! never overwrites a verified payment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PaymentRepository, PaymentRepositoryError, Settlement, WalletCredit};
use crate::domain::{Payment, PaymentStatus, PaymentType, PayoutRecipient, UserId, Wallet};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error, within_budget};
use super::models::{
    NewAccessCodeRow, NewNotificationRow, NewWalletRow, PaymentRow, PayoutRecipientRow, WalletRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{notifications, payment_access_codes, payments, payout_recipients, user_wallets};

/// Diesel implementation of [`PaymentRepository`].
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PaymentRepositoryError {
    map_basic_pool_error(error, PaymentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PaymentRepositoryError {
    map_basic_diesel_error(
        error,
        PaymentRepositoryError::query,
        PaymentRepositoryError::connection,
    )
}

/// Add `credit` to the user's counters, creating the wallet on first use.
///
/// The row is locked before the ledger rules are applied so concurrent
/// settlements for the same user serialise.
async fn apply_wallet_credit(
    conn: &mut AsyncPgConnection,
    credit: &WalletCredit,
    at: DateTime<Utc>,
) -> Result<(), diesel::result::Error> {
    let owner = *credit.user_id.as_uuid();
    let empty = NewWalletRow {
        id: Uuid::new_v4(),
        user_id: owner,
        credits: 0.0,
        debits: 0.0,
        created_at: at,
        updated_at: at,
    };
    diesel::insert_into(user_wallets::table)
        .values(&empty)
        .on_conflict(user_wallets::user_id)
        .do_nothing()
        .execute(conn)
        .await?;

    let current = user_wallets::table
        .filter(user_wallets::user_id.eq(owner))
        .select(WalletRow::as_select())
        .for_update()
        .first(conn)
        .await?;
    let wallet = Wallet::from(current).apply(credit.delta, at);
    diesel::update(user_wallets::table.filter(user_wallets::user_id.eq(owner)))
        .set((
            user_wallets::credits.eq(wallet.credits),
            user_wallets::debits.eq(wallet.debits),
            user_wallets::updated_at.eq(wallet.updated_at),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn settle_in(
    conn: &mut AsyncPgConnection,
    settlement: &Settlement,
    at: DateTime<Utc>,
) -> Result<bool, diesel::result::Error> {
    let updated = diesel::update(
        payments::table
            .filter(payments::id.eq(settlement.payment_id))
            .filter(payments::status.eq(PaymentStatus::Pending.as_str())),
    )
    .set((
        payments::status.eq(PaymentStatus::Verified.as_str()),
        payments::updated_at.eq(at),
    ))
    .execute(conn)
    .await?;
    if updated == 0 {
        return Ok(false);
    }

    if let Some(credit) = &settlement.wallet_credit {
        apply_wallet_credit(conn, credit, at).await?;
    }
    if let Some(notification) = &settlement.notification {
        diesel::insert_into(notifications::table)
            .values(NewNotificationRow::new(notification, at))
            .execute(conn)
            .await?;
    }
    Ok(true)
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn find_latest(
        &self,
        booking_id: Uuid,
        payment_type: PaymentType,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        within_budget(
            &self.pool,
            "payments.find_latest",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = payments::table
                    .filter(payments::booking_id.eq(Some(booking_id)))
                    .filter(payments::payment_type.eq(payment_type.as_str()))
                    .order(payments::created_at.desc())
                    .select(PaymentRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(PaymentRow::into_domain)
                    .transpose()
                    .map_err(PaymentRepositoryError::query)
            },
            PaymentRepositoryError::connection,
        )
        .await
    }

    async fn find_access_code(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<String>, PaymentRepositoryError> {
        within_budget(
            &self.pool,
            "payment_access_codes.find",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                payment_access_codes::table
                    .filter(payment_access_codes::payment_id.eq(payment_id))
                    .select(payment_access_codes::access_code)
                    .first::<String>(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)
            },
            PaymentRepositoryError::connection,
        )
        .await
    }

    async fn create_pending(
        &self,
        payment: &Payment,
        access_code: &str,
    ) -> Result<(), PaymentRepositoryError> {
        let payment_row = PaymentRow::from(payment);
        let code_row = NewAccessCodeRow {
            id: Uuid::new_v4(),
            payment_id: payment.id,
            access_code,
            created_at: payment.created_at,
        };
        within_budget(
            &self.pool,
            "payments.create_pending",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    async move {
                        diesel::insert_into(payments::table)
                            .values(&payment_row)
                            .execute(conn)
                            .await?;
                        diesel::insert_into(payment_access_codes::table)
                            .values(&code_row)
                            .execute(conn)
                            .await?;
                        Ok(())
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error)
            },
            PaymentRepositoryError::connection,
        )
        .await
    }

    async fn settle(
        &self,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> Result<bool, PaymentRepositoryError> {
        within_budget(
            &self.pool,
            "payments.settle",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    async move { settle_in(conn, settlement, at).await }.scope_boxed()
                })
                .await
                .map_err(map_diesel_error)
            },
            PaymentRepositoryError::connection,
        )
        .await
    }

    async fn cancel(&self, payment_id: Uuid, at: DateTime<Utc>) -> Result<(), PaymentRepositoryError> {
        within_budget(
            &self.pool,
            "payments.cancel",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    async move {
                        let canceled = diesel::update(
                            payments::table
                                .filter(payments::id.eq(payment_id))
                                .filter(payments::status.eq(PaymentStatus::Pending.as_str())),
                        )
                        .set((
                            payments::status.eq(PaymentStatus::Canceled.as_str()),
                            payments::updated_at.eq(at),
                        ))
                        .execute(conn)
                        .await?;
                        if canceled > 0 {
                            diesel::delete(
                                payment_access_codes::table
                                    .filter(payment_access_codes::payment_id.eq(payment_id)),
                            )
                            .execute(conn)
                            .await?;
                        }
                        Ok(())
                    }
                    .scope_boxed()
                })
                .await
                .map_err(map_diesel_error)
            },
            PaymentRepositoryError::connection,
        )
        .await
    }

    async fn find_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>, PaymentRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "user_wallets.find",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = user_wallets::table
                    .filter(user_wallets::user_id.eq(owner))
                    .select(WalletRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Ok(row.map(Wallet::from))
            },
            PaymentRepositoryError::connection,
        )
        .await
    }

    async fn upsert_recipient(
        &self,
        recipient: &PayoutRecipient,
    ) -> Result<(), PaymentRepositoryError> {
        let row = PayoutRecipientRow::from(recipient);
        within_budget(
            &self.pool,
            "payout_recipients.upsert",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(payout_recipients::table)
                    .values(&row)
                    .on_conflict(payout_recipients::user_id)
                    .do_update()
                    .set((
                        payout_recipients::recipient_code
                            .eq(excluded(payout_recipients::recipient_code)),
                        payout_recipients::account_name
                            .eq(excluded(payout_recipients::account_name)),
                        payout_recipients::updated_at.eq(excluded(payout_recipients::updated_at)),
                    ))
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_diesel_error)
            },
            PaymentRepositoryError::connection,
        )
        .await
    }
}

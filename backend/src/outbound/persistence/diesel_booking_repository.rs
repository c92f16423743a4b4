//! PostgreSQL-backed [`BookingRepository`].
//!
//! Lifecycle transitions run in one transaction each. Status changes are
//! conditional single-row updates on the expected current status, so a
//! concurrent writer that got there first leaves zero matched rows and the
//! loser sees [`BookingRepositoryError::StaleState`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BookingFilter, BookingRepository, BookingRepositoryError, BookingTransition};
use crate::domain::{Booking, BookingStatus, Invitation, InvitationStatus, NewNotification, UserId};

use super::diesel_helpers::{
    collect_rows, map_basic_diesel_error, map_basic_pool_error, within_budget,
};
use super::models::{BookingRow, InvitationRow, NewNotificationRow, NewRejectionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{booking_invitations, bookings, notifications, rejected_bookings};

/// Diesel implementation of [`BookingRepository`].
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    map_basic_pool_error(error, BookingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    map_basic_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// Failure inside a transition transaction.
#[derive(Debug)]
enum TransitionError {
    Database(diesel::result::Error),
    Stale(String),
}

impl From<diesel::result::Error> for TransitionError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<TransitionError> for BookingRepositoryError {
    fn from(error: TransitionError) -> Self {
        match error {
            TransitionError::Database(inner) => map_diesel_error(inner),
            TransitionError::Stale(message) => Self::stale_state(message),
        }
    }
}

/// Zero matched rows means the booking left the expected status.
fn ensure_matched(updated: usize, booking_id: Uuid, expected: BookingStatus) -> Result<(), TransitionError> {
    if updated == 0 {
        return Err(TransitionError::Stale(format!(
            "booking {booking_id} is no longer {expected}"
        )));
    }
    Ok(())
}

async fn insert_notification(
    conn: &mut AsyncPgConnection,
    notification: &NewNotification,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    diesel::insert_into(notifications::table)
        .values(NewNotificationRow::new(notification, at))
        .execute(conn)
        .await?;
    Ok(())
}

async fn set_invitation_status(
    conn: &mut AsyncPgConnection,
    booking_id: Uuid,
    invitee: &UserId,
    status: InvitationStatus,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    diesel::update(
        booking_invitations::table
            .filter(booking_invitations::booking_id.eq(booking_id))
            .filter(booking_invitations::invitee_id.eq(invitee.as_uuid())),
    )
    .set((
        booking_invitations::status.eq(status.as_str()),
        booking_invitations::updated_at.eq(at),
    ))
    .execute(conn)
    .await?;
    Ok(())
}

async fn move_status(
    conn: &mut AsyncPgConnection,
    booking_id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    let updated = diesel::update(
        bookings::table
            .filter(bookings::id.eq(booking_id))
            .filter(bookings::status.eq(from.as_str())),
    )
    .set((bookings::status.eq(to.as_str()), bookings::updated_at.eq(at)))
    .execute(conn)
    .await?;
    ensure_matched(updated, booking_id, from)
}

async fn apply(
    conn: &mut AsyncPgConnection,
    transition: &BookingTransition,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    match transition {
        BookingTransition::Invite {
            invitation,
            notification,
        } => invite(conn, invitation, notification, at).await,
        BookingTransition::Accept {
            booking_id,
            provider_id,
            notification,
        } => {
            let updated = diesel::update(
                bookings::table
                    .filter(bookings::id.eq(*booking_id))
                    .filter(bookings::status.eq(BookingStatus::Open.as_str())),
            )
            .set((
                bookings::status.eq(BookingStatus::InProgress.as_str()),
                bookings::provider_id.eq(Some(*provider_id.as_uuid())),
                bookings::updated_at.eq(at),
            ))
            .execute(conn)
            .await?;
            ensure_matched(updated, *booking_id, BookingStatus::Open)?;
            set_invitation_status(conn, *booking_id, provider_id, InvitationStatus::Accepted, at)
                .await?;
            insert_notification(conn, notification, at).await
        }
        BookingTransition::Reject {
            booking_id,
            provider_id,
            notification,
        } => {
            diesel::insert_into(rejected_bookings::table)
                .values(NewRejectionRow {
                    id: Uuid::new_v4(),
                    booking_id: *booking_id,
                    user_id: *provider_id.as_uuid(),
                    created_at: at,
                })
                .execute(conn)
                .await?;
            set_invitation_status(conn, *booking_id, provider_id, InvitationStatus::Rejected, at)
                .await?;
            insert_notification(conn, notification, at).await
        }
        BookingTransition::Complete {
            booking_id,
            notification,
        } => {
            move_status(
                conn,
                *booking_id,
                BookingStatus::InProgress,
                BookingStatus::Completed,
                at,
            )
            .await?;
            if let Some(notification) = notification {
                insert_notification(conn, notification, at).await?;
            }
            Ok(())
        }
        BookingTransition::Cancel {
            booking_id,
            from,
            notification,
        } => {
            move_status(conn, *booking_id, *from, BookingStatus::Canceled, at).await?;
            if let Some(notification) = notification {
                insert_notification(conn, notification, at).await?;
            }
            Ok(())
        }
    }
}

async fn invite(
    conn: &mut AsyncPgConnection,
    invitation: &Invitation,
    notification: &NewNotification,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    let inserted = diesel::insert_into(booking_invitations::table)
        .values(InvitationRow::from(invitation))
        .on_conflict((booking_invitations::booking_id, booking_invitations::invitee_id))
        .do_nothing()
        .execute(conn)
        .await?;
    if inserted == 0 {
        debug!(booking_id = %invitation.booking_id, "provider already invited");
        return Ok(());
    }
    insert_notification(conn, notification, at).await
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let row = BookingRow::from(booking);
        within_budget(
            &self.pool,
            "bookings.create",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(bookings::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_diesel_error)
            },
            BookingRepositoryError::connection,
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingRepositoryError> {
        within_budget(
            &self.pool,
            "bookings.find_by_id",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = bookings::table
                    .filter(bookings::id.eq(id))
                    .select(BookingRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(BookingRow::into_domain)
                    .transpose()
                    .map_err(BookingRepositoryError::query)
            },
            BookingRepositoryError::connection,
        )
        .await
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut query = bookings::table
            .select(BookingRow::as_select())
            .order(bookings::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .into_boxed();
        if let Some(participant) = &filter.participant {
            let id = *participant.as_uuid();
            query = query.filter(
                bookings::requester_id
                    .eq(id)
                    .or(bookings::provider_id.eq(Some(id))),
            );
        }
        if let Some(requester) = &filter.requester_id {
            query = query.filter(bookings::requester_id.eq(*requester.as_uuid()));
        }
        if let Some(provider) = &filter.provider_id {
            query = query.filter(bookings::provider_id.eq(Some(*provider.as_uuid())));
        }
        if let Some(service_type) = filter.service_type {
            query = query.filter(bookings::service_type.eq(service_type.as_str()));
        }
        if let Some(booking_type) = filter.booking_type {
            query = query.filter(bookings::booking_type.eq(booking_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(bookings::status.eq(status.as_str()));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(bookings::start_date.ge(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(bookings::end_date.le(end));
        }

        within_budget(
            &self.pool,
            "bookings.list",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<BookingRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
                collect_rows(rows, BookingRow::into_domain, BookingRepositoryError::query)
            },
            BookingRepositoryError::connection,
        )
        .await
    }

    async fn find_invitation(
        &self,
        booking_id: Uuid,
        invitee: &UserId,
    ) -> Result<Option<Invitation>, BookingRepositoryError> {
        let invitee = *invitee.as_uuid();
        within_budget(
            &self.pool,
            "booking_invitations.find",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = booking_invitations::table
                    .filter(booking_invitations::booking_id.eq(booking_id))
                    .filter(booking_invitations::invitee_id.eq(invitee))
                    .select(InvitationRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(InvitationRow::into_domain)
                    .transpose()
                    .map_err(BookingRepositoryError::query)
            },
            BookingRepositoryError::connection,
        )
        .await
    }

    async fn has_rejected(
        &self,
        booking_id: Uuid,
        provider: &UserId,
    ) -> Result<bool, BookingRepositoryError> {
        let provider = *provider.as_uuid();
        within_budget(
            &self.pool,
            "rejected_bookings.exists",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::select(diesel::dsl::exists(
                    rejected_bookings::table
                        .filter(rejected_bookings::booking_id.eq(booking_id))
                        .filter(rejected_bookings::user_id.eq(provider)),
                ))
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)
            },
            BookingRepositoryError::connection,
        )
        .await
    }

    async fn apply_transition(
        &self,
        transition: &BookingTransition,
        at: DateTime<Utc>,
    ) -> Result<(), BookingRepositoryError> {
        within_budget(
            &self.pool,
            "bookings.apply_transition",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                conn.transaction::<_, TransitionError, _>(|conn| {
                    async move { apply(conn, transition, at).await }.scope_boxed()
                })
                .await
                .map_err(BookingRepositoryError::from)
            },
            BookingRepositoryError::connection,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn zero_matched_rows_is_stale() {
        let booking_id = Uuid::new_v4();
        let error = ensure_matched(0, booking_id, BookingStatus::Open).expect_err("stale");
        let mapped = BookingRepositoryError::from(error);

        assert!(matches!(mapped, BookingRepositoryError::StaleState { .. }));
        assert!(mapped.message().contains("no longer open"));
    }

    #[rstest]
    fn one_matched_row_passes() {
        assert!(ensure_matched(1, Uuid::new_v4(), BookingStatus::InProgress).is_ok());
    }

    #[rstest]
    fn database_failures_inside_transactions_keep_their_kind() {
        let mapped = BookingRepositoryError::from(TransitionError::from(
            diesel::result::Error::RollbackTransaction,
        ));
        assert!(matches!(mapped, BookingRepositoryError::Query { .. }));
    }
}

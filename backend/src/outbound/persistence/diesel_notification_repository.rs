//! PostgreSQL-backed [`NotificationRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{NotificationFilter, NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, UserId};

use super::diesel_helpers::{
    collect_rows, map_basic_diesel_error, map_basic_pool_error, within_budget,
};
use super::models::NotificationRow;
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel implementation of [`NotificationRepository`].
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    map_basic_pool_error(error, NotificationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_basic_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn list(
        &self,
        user_id: &UserId,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut query = notifications::table
            .filter(notifications::user_id.eq(*user_id.as_uuid()))
            .select(NotificationRow::as_select())
            .order(notifications::created_at.desc())
            .limit(page.limit())
            .offset(page.offset())
            .into_boxed();
        if let Some(kind) = filter.kind {
            query = query.filter(notifications::kind.eq(kind.as_str()));
        }
        if let Some(booking_id) = filter.booking_id {
            query = query.filter(notifications::booking_id.eq(Some(booking_id)));
        }
        if let Some(seen) = filter.seen {
            query = query.filter(notifications::seen.eq(seen));
        }

        within_budget(
            &self.pool,
            "notifications.list",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<NotificationRow> =
                    query.load(&mut conn).await.map_err(map_diesel_error)?;
                collect_rows(
                    rows,
                    NotificationRow::into_domain,
                    NotificationRepositoryError::query,
                )
            },
            NotificationRepositoryError::connection,
        )
        .await
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: Uuid,
    ) -> Result<bool, NotificationRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "notifications.mark_read",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let updated = diesel::update(
                    notifications::table
                        .filter(notifications::id.eq(notification_id))
                        .filter(notifications::user_id.eq(owner)),
                )
                .set(notifications::seen.eq(true))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(updated > 0)
            },
            NotificationRepositoryError::connection,
        )
        .await
    }

    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "notifications.mark_all_read",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let updated = diesel::update(
                    notifications::table
                        .filter(notifications::user_id.eq(owner))
                        .filter(notifications::seen.eq(false)),
                )
                .set(notifications::seen.eq(true))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(updated as u64)
            },
            NotificationRepositoryError::connection,
        )
        .await
    }

    async fn count_unseen(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "notifications.count_unseen",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let count: i64 = notifications::table
                    .filter(notifications::user_id.eq(owner))
                    .filter(notifications::seen.eq(false))
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                Ok(to_count(count))
            },
            NotificationRepositoryError::connection,
        )
        .await
    }
}

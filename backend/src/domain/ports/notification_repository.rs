//! Port for the notification inbox store.

use async_trait::async_trait;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{Notification, NotificationKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "notification repository query failed: {message}",
    }
}

/// Optional inbox filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    pub kind: Option<NotificationKind>,
    pub booking_id: Option<Uuid>,
    pub seen: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Page through a user's inbox, newest first.
    async fn list(
        &self,
        user_id: &UserId,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Mark one entry seen. `false` when it does not belong to the user.
    async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: Uuid,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unseen entry seen, returning how many changed.
    async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Number of unseen entries.
    async fn count_unseen(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;
}

/// Fixture inbox that is always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn list(
        &self,
        _user_id: &UserId,
        _filter: NotificationFilter,
        _page: PageRequest,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        Ok(Vec::new())
    }

    async fn mark_read(
        &self,
        _user_id: &UserId,
        _notification_id: Uuid,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }

    async fn mark_all_read(&self, _user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }

    async fn count_unseen(&self, _user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_inbox_is_empty() {
        let user = UserId::random();
        let repo = FixtureNotificationRepository;
        let items = repo
            .list(&user, NotificationFilter::default(), PageRequest::default())
            .await
            .expect("fixture list succeeds");
        assert!(items.is_empty());
        assert_eq!(repo.count_unseen(&user).await.expect("count"), 0);
    }
}

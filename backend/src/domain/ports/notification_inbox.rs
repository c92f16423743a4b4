//! Driving port for the signed-in user's notification inbox.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Error, Notification, User};

use super::NotificationFilter;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// The actor's notifications, newest first.
    async fn list(
        &self,
        actor: &User,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error>;

    /// Mark one of the actor's notifications seen.
    async fn mark_read(&self, actor: &User, notification_id: Uuid) -> Result<(), Error>;

    /// Mark all of the actor's notifications seen.
    async fn mark_all_read(&self, actor: &User) -> Result<u64, Error>;

    /// Unseen notifications for the actor.
    async fn count_unseen(&self, actor: &User) -> Result<u64, Error>;
}

/// Fixture inbox that is always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationInbox;

#[async_trait]
impl NotificationInbox for FixtureNotificationInbox {
    async fn list(
        &self,
        _actor: &User,
        _filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error> {
        Ok(Page::new(Vec::new(), page))
    }

    async fn mark_read(&self, _actor: &User, notification_id: Uuid) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "notification {notification_id} not found"
        )))
    }

    async fn mark_all_read(&self, _actor: &User) -> Result<u64, Error> {
        Ok(0)
    }

    async fn count_unseen(&self, _actor: &User) -> Result<u64, Error> {
        Ok(0)
    }
}

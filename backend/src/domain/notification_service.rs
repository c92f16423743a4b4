//! Notification inbox service.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    NotificationFilter, NotificationInbox, NotificationRepository, NotificationRepositoryError,
};
use crate::domain::{Error, Notification, User};

fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

/// Inbox service implementing [`NotificationInbox`].
#[derive(Clone)]
pub struct NotificationService<N> {
    notification_repo: Arc<N>,
}

impl<N> NotificationService<N> {
    pub fn new(notification_repo: Arc<N>) -> Self {
        Self { notification_repo }
    }
}

#[async_trait]
impl<N> NotificationInbox for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn list(
        &self,
        actor: &User,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error> {
        let items = self
            .notification_repo
            .list(&actor.id, filter, page)
            .await
            .map_err(map_notification_error)?;
        Ok(Page::new(items, page))
    }

    async fn mark_read(&self, actor: &User, notification_id: Uuid) -> Result<(), Error> {
        let updated = self
            .notification_repo
            .mark_read(&actor.id, notification_id)
            .await
            .map_err(map_notification_error)?;
        if !updated {
            return Err(Error::not_found(format!(
                "notification {notification_id} not found"
            )));
        }
        Ok(())
    }

    async fn mark_all_read(&self, actor: &User) -> Result<u64, Error> {
        let changed = self
            .notification_repo
            .mark_all_read(&actor.id)
            .await
            .map_err(map_notification_error)?;
        debug!(user_id = %actor.id, changed, "notifications marked read");
        Ok(changed)
    }

    async fn count_unseen(&self, actor: &User) -> Result<u64, Error> {
        self.notification_repo
            .count_unseen(&actor.id)
            .await
            .map_err(map_notification_error)
    }
}

//! Driving ports for member profiles and roles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Error, ProfileEdit, Role, ServiceRole, User, UserFilter, UserId, UserProfile};

/// Changes members make to themselves, and role changes by super admins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Edit the actor's own profile.
    async fn update_profile(&self, actor: &User, edit: ProfileEdit) -> Result<UserProfile, Error>;

    /// Switch the actor between provider, requester, or both.
    async fn set_service_role(
        &self,
        actor: &User,
        service_role: ServiceRole,
    ) -> Result<UserProfile, Error>;

    /// Change another member's platform role.
    async fn set_role(
        &self,
        actor: &User,
        target: &UserId,
        role: Role,
    ) -> Result<UserProfile, Error>;
}

/// Profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// The actor's own full profile.
    async fn own_profile(&self, actor: &User) -> Result<UserProfile, Error>;

    /// Another member's profile. Only administrators see contact details.
    async fn profile(&self, actor: &User, target: &UserId) -> Result<UserProfile, Error>;

    /// Member directory for administrators.
    async fn list_users(
        &self,
        actor: &User,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error>;
}

/// Fixture that reads back the caller and refuses every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserCommand;

fn unconfigured() -> Error {
    Error::service_unavailable("user store is not configured")
}

#[async_trait]
impl UserCommand for FixtureUserCommand {
    async fn update_profile(&self, _actor: &User, _edit: ProfileEdit) -> Result<UserProfile, Error> {
        Err(unconfigured())
    }

    async fn set_service_role(
        &self,
        _actor: &User,
        _service_role: ServiceRole,
    ) -> Result<UserProfile, Error> {
        Err(unconfigured())
    }

    async fn set_role(
        &self,
        _actor: &User,
        _target: &UserId,
        _role: Role,
    ) -> Result<UserProfile, Error> {
        Err(unconfigured())
    }
}

#[async_trait]
impl UserQuery for FixtureUserCommand {
    async fn own_profile(&self, actor: &User) -> Result<UserProfile, Error> {
        Ok(UserProfile::bare(actor, DateTime::<Utc>::UNIX_EPOCH))
    }

    async fn profile(&self, _actor: &User, target: &UserId) -> Result<UserProfile, Error> {
        Err(Error::not_found(format!("user {target} not found")))
    }

    async fn list_users(
        &self,
        _actor: &User,
        _filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        Ok(Page::new(Vec::new(), page))
    }
}

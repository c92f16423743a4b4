//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{ProfileUpdate, Role, ServiceRole, User, UserFilter, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user record.
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user together with their profile fields.
    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, UserPersistenceError>;

    /// Write the fields `update` sets and stamp `updated_at`.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError>;

    /// Replace the platform role.
    async fn set_role(
        &self,
        id: &UserId,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError>;

    /// Replace the marketplace participation.
    async fn set_service_role(
        &self,
        id: &UserId,
        service_role: ServiceRole,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError>;

    /// Profiles matching `filter`, newest first.
    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, UserPersistenceError>;
}

/// Fixture repository that knows every requested id as a dual-role member.
///
/// Writes are not persisted; they return the fixture profile with the change
/// applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

fn fixture_user(id: &UserId) -> User {
    User {
        id: id.clone(),
        email: format!("{id}@fixture.invalid"),
        role: Role::Regular,
        service_role: ServiceRole::Both,
    }
}

fn fixture_profile(id: &UserId) -> UserProfile {
    UserProfile::bare(&fixture_user(id), DateTime::<Utc>::UNIX_EPOCH)
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn upsert(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(Some(fixture_user(id)))
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, UserPersistenceError> {
        Ok(Some(fixture_profile(id)))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let mut profile = fixture_profile(id);
        profile.apply(update, at);
        Ok(Some(profile))
    }

    async fn set_role(
        &self,
        id: &UserId,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        Ok(Some(UserProfile {
            role,
            updated_at: at,
            ..fixture_profile(id)
        }))
    }

    async fn set_service_role(
        &self,
        id: &UserId,
        service_role: ServiceRole,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        Ok(Some(UserProfile {
            service_role,
            updated_at: at,
            ..fixture_profile(id)
        }))
    }

    async fn list_profiles(
        &self,
        _filter: &UserFilter,
        _page: PageRequest,
    ) -> Result<Vec<UserProfile>, UserPersistenceError> {
        Ok(Vec::new())
    }
}

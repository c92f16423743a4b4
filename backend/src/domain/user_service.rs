//! Member profiles, service roles, and administrator role changes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;

use crate::domain::ports::{UserCommand, UserPersistenceError, UserQuery, UserRepository};
use crate::domain::{
    Capability, Error, ProfileEdit, ProfileUpdate, ProfileValidationError, Role, ServiceRole,
    User, UserFilter, UserId, UserProfile, authorize,
};

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn invalid_profile(error: &ProfileValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_profile",
    }))
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

const DIRECTORY_DENIED: &str = "only administrators may browse members";
const ROLES_DENIED: &str = "only super administrators may change roles";

/// Implements [`UserCommand`] and [`UserQuery`] over a user repository.
#[derive(Clone)]
pub struct UserService<U> {
    user_repo: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> UserService<U> {
    pub fn new(user_repo: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { user_repo, clock }
    }
}

#[async_trait]
impl<U> UserCommand for UserService<U>
where
    U: UserRepository,
{
    async fn update_profile(&self, actor: &User, edit: ProfileEdit) -> Result<UserProfile, Error> {
        let update = ProfileUpdate::try_from(edit).map_err(|err| invalid_profile(&err))?;
        if update.is_empty() {
            return Err(Error::invalid_request(
                "profile update must set at least one field",
            ));
        }
        let profile = self
            .user_repo
            .update_profile(&actor.id, &update, self.clock.utc())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(&actor.id))?;
        info!(user_id = %actor.id, "profile updated");
        Ok(profile)
    }

    async fn set_service_role(
        &self,
        actor: &User,
        service_role: ServiceRole,
    ) -> Result<UserProfile, Error> {
        let profile = self
            .user_repo
            .set_service_role(&actor.id, service_role, self.clock.utc())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(&actor.id))?;
        info!(user_id = %actor.id, service_role = service_role.as_str(), "service role changed");
        Ok(profile)
    }

    async fn set_role(
        &self,
        actor: &User,
        target: &UserId,
        role: Role,
    ) -> Result<UserProfile, Error> {
        authorize(actor, Capability::ManageRoles, ROLES_DENIED)?;
        if &actor.id == target {
            return Err(Error::forbidden(
                "super administrators cannot change their own role",
            ));
        }
        let profile = self
            .user_repo
            .set_role(target, role, self.clock.utc())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(target))?;
        info!(actor = %actor.id, user_id = %target, role = role.as_str(), "role changed");
        Ok(profile)
    }
}

#[async_trait]
impl<U> UserQuery for UserService<U>
where
    U: UserRepository,
{
    async fn own_profile(&self, actor: &User) -> Result<UserProfile, Error> {
        self.user_repo
            .find_profile(&actor.id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(&actor.id))
    }

    async fn profile(&self, actor: &User, target: &UserId) -> Result<UserProfile, Error> {
        let profile = self
            .user_repo
            .find_profile(target)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(target))?;
        if &actor.id == target || actor.can(Capability::ViewUserDirectory) {
            Ok(profile)
        } else {
            Ok(profile.public_view())
        }
    }

    async fn list_users(
        &self,
        actor: &User,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        authorize(actor, Capability::ViewUserDirectory, DIRECTORY_DENIED)?;
        let items = self
            .user_repo
            .list_profiles(&filter, page)
            .await
            .map_err(map_user_repository_error)?;
        Ok(Page::new(items, page))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;

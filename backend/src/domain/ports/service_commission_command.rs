//! Driving port for the platform commission.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, ServiceCommission, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCommissionCommand: Send + Sync {
    async fn create(&self, actor: &User, percentage: i32) -> Result<ServiceCommission, Error>;

    /// The configured commission. Any signed-in user may read it.
    async fn get(&self, actor: &User) -> Result<ServiceCommission, Error>;

    async fn update(
        &self,
        actor: &User,
        id: Uuid,
        percentage: i32,
    ) -> Result<ServiceCommission, Error>;
}

/// Fixture that refuses every commission request.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureServiceCommissionCommand;

fn unconfigured() -> Error {
    Error::service_unavailable("commission store is not configured")
}

#[async_trait]
impl ServiceCommissionCommand for FixtureServiceCommissionCommand {
    async fn create(&self, _actor: &User, _percentage: i32) -> Result<ServiceCommission, Error> {
        Err(unconfigured())
    }

    async fn get(&self, _actor: &User) -> Result<ServiceCommission, Error> {
        Err(unconfigured())
    }

    async fn update(
        &self,
        _actor: &User,
        _id: Uuid,
        _percentage: i32,
    ) -> Result<ServiceCommission, Error> {
        Err(unconfigured())
    }
}

//! Driving port for administering hourly rates.

use async_trait::async_trait;

use crate::domain::{Error, ServicePricing, ServiceType, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServicePricingCommand: Send + Sync {
    async fn create(
        &self,
        actor: &User,
        service_type: ServiceType,
        rate_per_hour: f64,
    ) -> Result<ServicePricing, Error>;

    async fn get(&self, actor: &User, service_type: ServiceType) -> Result<ServicePricing, Error>;

    async fn list(&self, actor: &User) -> Result<Vec<ServicePricing>, Error>;

    async fn update(
        &self,
        actor: &User,
        service_type: ServiceType,
        rate_per_hour: f64,
    ) -> Result<ServicePricing, Error>;

    async fn delete(&self, actor: &User, service_type: ServiceType) -> Result<(), Error>;
}

/// Fixture that refuses every pricing change.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureServicePricingCommand;

fn unconfigured() -> Error {
    Error::service_unavailable("pricing store is not configured")
}

#[async_trait]
impl ServicePricingCommand for FixtureServicePricingCommand {
    async fn create(
        &self,
        _actor: &User,
        _service_type: ServiceType,
        _rate_per_hour: f64,
    ) -> Result<ServicePricing, Error> {
        Err(unconfigured())
    }

    async fn get(&self, _actor: &User, _service_type: ServiceType) -> Result<ServicePricing, Error> {
        Err(unconfigured())
    }

    async fn list(&self, _actor: &User) -> Result<Vec<ServicePricing>, Error> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        _actor: &User,
        _service_type: ServiceType,
        _rate_per_hour: f64,
    ) -> Result<ServicePricing, Error> {
        Err(unconfigured())
    }

    async fn delete(&self, _actor: &User, _service_type: ServiceType) -> Result<(), Error> {
        Err(unconfigured())
    }
}

//! Service pricing administration and the booking price resolver.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    ServicePricingCommand, ServicePricingRepository, ServicePricingRepositoryError,
};
use crate::domain::{
    BookingSchedule, BookingType, Capability, Error, ServicePricing, ServiceType, User,
    authorize, resolve_price,
};

pub(crate) fn map_pricing_repository_error(error: ServicePricingRepositoryError) -> Error {
    match error {
        ServicePricingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("service pricing repository unavailable: {message}"))
        }
        ServicePricingRepositoryError::Query { message } => {
            Error::internal(format!("service pricing repository error: {message}"))
        }
        ServicePricingRepositoryError::Conflict { message } => {
            Error::conflict(format!("service pricing already exists: {message}"))
        }
    }
}

fn no_pricing(service_type: ServiceType) -> Error {
    Error::not_found(format!("no pricing configured for {service_type}"))
}

/// Looks up the hourly rate for a service type and prices a schedule.
pub struct PricingResolver<P> {
    pricing_repo: Arc<P>,
}

impl<P> Clone for PricingResolver<P> {
    fn clone(&self) -> Self {
        Self {
            pricing_repo: Arc::clone(&self.pricing_repo),
        }
    }
}

impl<P: ServicePricingRepository> PricingResolver<P> {
    pub fn new(pricing_repo: Arc<P>) -> Self {
        Self { pricing_repo }
    }

    /// Total price of a booking.
    ///
    /// Fails with not-found when the service type has no rate and with an
    /// invalid-request error when the schedule is outside the allowed range.
    pub async fn price(
        &self,
        service_type: ServiceType,
        booking_type: BookingType,
        schedule: &BookingSchedule,
    ) -> Result<f64, Error> {
        let pricing = self
            .pricing_repo
            .find_by_service_type(service_type)
            .await
            .map_err(map_pricing_repository_error)?
            .ok_or_else(|| no_pricing(service_type))?;

        resolve_price(pricing.rate_per_hour, booking_type, schedule)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

fn validate_rate(rate_per_hour: f64) -> Result<(), Error> {
    if rate_per_hour.is_finite() && rate_per_hour > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_request("ratePerHour must be greater than zero")
            .with_details(serde_json::json!({
                "field": "ratePerHour",
                "value": rate_per_hour,
                "code": "invalid_rate",
            })))
    }
}

const MANAGE_DENIED: &str = "only super administrators may manage service pricing";

/// Super-admin management of hourly rates.
#[derive(Clone)]
pub struct ServicePricingService<P> {
    pricing_repo: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> ServicePricingService<P> {
    pub fn new(pricing_repo: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pricing_repo,
            clock,
        }
    }
}

#[async_trait]
impl<P> ServicePricingCommand for ServicePricingService<P>
where
    P: ServicePricingRepository,
{
    async fn create(
        &self,
        actor: &User,
        service_type: ServiceType,
        rate_per_hour: f64,
    ) -> Result<ServicePricing, Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        validate_rate(rate_per_hour)?;

        let now = self.clock.utc();
        let pricing = ServicePricing {
            id: Uuid::new_v4(),
            service_type,
            rate_per_hour,
            created_at: now,
            updated_at: now,
        };
        self.pricing_repo
            .create(&pricing)
            .await
            .map_err(map_pricing_repository_error)?;
        info!(%service_type, rate_per_hour, "service pricing created");
        Ok(pricing)
    }

    async fn get(&self, actor: &User, service_type: ServiceType) -> Result<ServicePricing, Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        self.pricing_repo
            .find_by_service_type(service_type)
            .await
            .map_err(map_pricing_repository_error)?
            .ok_or_else(|| no_pricing(service_type))
    }

    async fn list(&self, actor: &User) -> Result<Vec<ServicePricing>, Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        self.pricing_repo
            .list()
            .await
            .map_err(map_pricing_repository_error)
    }

    async fn update(
        &self,
        actor: &User,
        service_type: ServiceType,
        rate_per_hour: f64,
    ) -> Result<ServicePricing, Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        validate_rate(rate_per_hour)?;

        let updated = self
            .pricing_repo
            .update_rate(service_type, rate_per_hour, self.clock.utc())
            .await
            .map_err(map_pricing_repository_error)?
            .ok_or_else(|| no_pricing(service_type))?;
        info!(%service_type, rate_per_hour, "service pricing updated");
        Ok(updated)
    }

    async fn delete(&self, actor: &User, service_type: ServiceType) -> Result<(), Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        let removed = self
            .pricing_repo
            .delete(service_type)
            .await
            .map_err(map_pricing_repository_error)?;
        if !removed {
            return Err(no_pricing(service_type));
        }
        info!(%service_type, "service pricing deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "pricing_service_tests.rs"]
mod tests;

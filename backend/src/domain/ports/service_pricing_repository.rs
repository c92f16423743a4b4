//! Port for per-service-type hourly rates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ServicePricing, ServiceType};

use super::define_port_error;

define_port_error! {
    /// Errors raised by service pricing repository adapters.
    pub enum ServicePricingRepositoryError {
        /// Repository connection could not be established.
        Connection => "service pricing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "service pricing repository query failed: {message}",
        /// A pricing row for the service type already exists.
        Conflict => "service pricing already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServicePricingRepository: Send + Sync {
    /// Insert a new pricing row.
    async fn create(&self, pricing: &ServicePricing) -> Result<(), ServicePricingRepositoryError>;

    /// Pricing for a service type.
    async fn find_by_service_type(
        &self,
        service_type: ServiceType,
    ) -> Result<Option<ServicePricing>, ServicePricingRepositoryError>;

    /// Every pricing row ordered by service type.
    async fn list(&self) -> Result<Vec<ServicePricing>, ServicePricingRepositoryError>;

    /// Replace the hourly rate, returning the updated row.
    async fn update_rate(
        &self,
        service_type: ServiceType,
        rate_per_hour: f64,
        at: DateTime<Utc>,
    ) -> Result<Option<ServicePricing>, ServicePricingRepositoryError>;

    /// Remove a pricing row. `false` when none existed.
    async fn delete(&self, service_type: ServiceType) -> Result<bool, ServicePricingRepositoryError>;
}

/// Hourly rate the fixture quotes for every service type.
pub const FIXTURE_RATE_PER_HOUR: f64 = 5000.0;

/// Fixture repository quoting [`FIXTURE_RATE_PER_HOUR`] for every type.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureServicePricingRepository;

fn fixture_pricing(service_type: ServiceType) -> ServicePricing {
    let at = DateTime::<Utc>::UNIX_EPOCH;
    ServicePricing {
        id: uuid::Uuid::nil(),
        service_type,
        rate_per_hour: FIXTURE_RATE_PER_HOUR,
        created_at: at,
        updated_at: at,
    }
}

#[async_trait]
impl ServicePricingRepository for FixtureServicePricingRepository {
    async fn create(&self, _pricing: &ServicePricing) -> Result<(), ServicePricingRepositoryError> {
        Ok(())
    }

    async fn find_by_service_type(
        &self,
        service_type: ServiceType,
    ) -> Result<Option<ServicePricing>, ServicePricingRepositoryError> {
        Ok(Some(fixture_pricing(service_type)))
    }

    async fn list(&self) -> Result<Vec<ServicePricing>, ServicePricingRepositoryError> {
        Ok(ServiceType::ALL.into_iter().map(fixture_pricing).collect())
    }

    async fn update_rate(
        &self,
        service_type: ServiceType,
        rate_per_hour: f64,
        at: DateTime<Utc>,
    ) -> Result<Option<ServicePricing>, ServicePricingRepositoryError> {
        let mut pricing = fixture_pricing(service_type);
        pricing.rate_per_hour = rate_per_hour;
        pricing.updated_at = at;
        Ok(Some(pricing))
    }

    async fn delete(&self, _service_type: ServiceType) -> Result<bool, ServicePricingRepositoryError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_prices_every_type() {
        let rows = FixtureServicePricingRepository
            .list()
            .await
            .expect("fixture list succeeds");
        assert_eq!(rows.len(), ServiceType::ALL.len());
        assert!(rows.iter().all(|row| row.rate_per_hour == FIXTURE_RATE_PER_HOUR));
    }

    #[rstest]
    fn conflict_error_message() {
        let err = ServicePricingRepositoryError::conflict("cleaning");
        assert_eq!(err.to_string(), "service pricing already exists: cleaning");
    }
}

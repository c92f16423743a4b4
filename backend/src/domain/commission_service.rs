//! Super-admin management of the platform commission.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    ServiceCommissionCommand, ServiceCommissionRepository, ServiceCommissionRepositoryError,
};
use crate::domain::{
    COMMISSION_PERCENTAGE_RANGE, Capability, Error, ServiceCommission, User, authorize,
};

fn map_commission_repository_error(error: ServiceCommissionRepositoryError) -> Error {
    match error {
        ServiceCommissionRepositoryError::Connection { message } => Error::service_unavailable(
            format!("service commission repository unavailable: {message}"),
        ),
        ServiceCommissionRepositoryError::Query { message } => {
            Error::internal(format!("service commission repository error: {message}"))
        }
        ServiceCommissionRepositoryError::Conflict { message } => {
            Error::conflict(format!("service commission already exists: {message}"))
        }
    }
}

fn validate_percentage(percentage: i32) -> Result<(), Error> {
    if ServiceCommission::is_valid_percentage(percentage) {
        return Ok(());
    }
    Err(Error::invalid_request(format!(
        "percentage must be between {} and {}",
        COMMISSION_PERCENTAGE_RANGE.start(),
        COMMISSION_PERCENTAGE_RANGE.end()
    ))
    .with_details(serde_json::json!({
        "field": "percentage",
        "value": percentage,
        "code": "invalid_percentage",
    })))
}

const MANAGE_DENIED: &str = "only super administrators may manage the service commission";

/// Implements [`ServiceCommissionCommand`] over a commission repository.
#[derive(Clone)]
pub struct ServiceCommissionService<C> {
    commission_repo: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C> ServiceCommissionService<C> {
    pub fn new(commission_repo: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            commission_repo,
            clock,
        }
    }
}

#[async_trait]
impl<C> ServiceCommissionCommand for ServiceCommissionService<C>
where
    C: ServiceCommissionRepository,
{
    async fn create(&self, actor: &User, percentage: i32) -> Result<ServiceCommission, Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        validate_percentage(percentage)?;

        let now = self.clock.utc();
        let commission = ServiceCommission {
            id: Uuid::new_v4(),
            percentage,
            created_at: now,
            updated_at: now,
        };
        self.commission_repo
            .create(&commission)
            .await
            .map_err(map_commission_repository_error)?;
        info!(percentage, "service commission created");
        Ok(commission)
    }

    async fn get(&self, _actor: &User) -> Result<ServiceCommission, Error> {
        self.commission_repo
            .current()
            .await
            .map_err(map_commission_repository_error)?
            .ok_or_else(|| Error::not_found("no service commission configured"))
    }

    async fn update(
        &self,
        actor: &User,
        id: Uuid,
        percentage: i32,
    ) -> Result<ServiceCommission, Error> {
        authorize(actor, Capability::ManagePricing, MANAGE_DENIED)?;
        validate_percentage(percentage)?;

        let updated = self
            .commission_repo
            .update_percentage(id, percentage, self.clock.utc())
            .await
            .map_err(map_commission_repository_error)?
            .ok_or_else(|| Error::not_found(format!("service commission {id} not found")))?;
        info!(%id, percentage, "service commission updated");
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "commission_service_tests.rs"]
mod tests;

//! Port for the platform commission row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ServiceCommission;

use super::define_port_error;

define_port_error! {
    /// Errors raised by service commission repository adapters.
    pub enum ServiceCommissionRepositoryError {
        /// Repository connection could not be established.
        Connection => "service commission repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "service commission repository query failed: {message}",
        /// A commission is already configured.
        Conflict => "service commission already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCommissionRepository: Send + Sync {
    /// Insert the commission row. Fails with a conflict when one exists.
    async fn create(
        &self,
        commission: &ServiceCommission,
    ) -> Result<(), ServiceCommissionRepositoryError>;

    /// The configured commission, if any.
    async fn current(&self) -> Result<Option<ServiceCommission>, ServiceCommissionRepositoryError>;

    /// Replace the percentage of the row with `id`, returning the updated row.
    async fn update_percentage(
        &self,
        id: Uuid,
        percentage: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<ServiceCommission>, ServiceCommissionRepositoryError>;
}

/// Percentage the fixture reports as configured.
pub const FIXTURE_COMMISSION_PERCENTAGE: i32 = 10;

/// Fixture repository holding a single [`FIXTURE_COMMISSION_PERCENTAGE`] row.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureServiceCommissionRepository;

fn fixture_commission() -> ServiceCommission {
    let at = DateTime::<Utc>::UNIX_EPOCH;
    ServiceCommission {
        id: Uuid::nil(),
        percentage: FIXTURE_COMMISSION_PERCENTAGE,
        created_at: at,
        updated_at: at,
    }
}

#[async_trait]
impl ServiceCommissionRepository for FixtureServiceCommissionRepository {
    async fn create(
        &self,
        _commission: &ServiceCommission,
    ) -> Result<(), ServiceCommissionRepositoryError> {
        Err(ServiceCommissionRepositoryError::conflict(
            "fixture commission is already configured",
        ))
    }

    async fn current(&self) -> Result<Option<ServiceCommission>, ServiceCommissionRepositoryError> {
        Ok(Some(fixture_commission()))
    }

    async fn update_percentage(
        &self,
        id: Uuid,
        percentage: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<ServiceCommission>, ServiceCommissionRepositoryError> {
        if id != Uuid::nil() {
            return Ok(None);
        }
        let mut commission = fixture_commission();
        commission.percentage = percentage;
        commission.updated_at = at;
        Ok(Some(commission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_rejects_a_second_commission() {
        let error = FixtureServiceCommissionRepository
            .create(&fixture_commission())
            .await
            .expect_err("fixture already holds a row");
        assert!(matches!(
            error,
            ServiceCommissionRepositoryError::Conflict { .. }
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_only_updates_its_own_row() {
        let at = DateTime::<Utc>::UNIX_EPOCH;
        let missing = FixtureServiceCommissionRepository
            .update_percentage(Uuid::new_v4(), 20, at)
            .await
            .expect("fixture update succeeds");
        assert!(missing.is_none());
    }
}

//! PostgreSQL-backed [`ServiceCommissionRepository`].
//!
//! The table's unique `singleton` column keeps it to one row, so a second
//! insert surfaces as a conflict.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ServiceCommission;
use crate::domain::ports::{ServiceCommissionRepository, ServiceCommissionRepositoryError};

use super::diesel_helpers::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error, within_budget,
};
use super::models::ServiceCommissionRow;
use super::pool::{DbPool, PoolError};
use super::schema::service_commissions;

/// Diesel implementation of [`ServiceCommissionRepository`].
#[derive(Clone)]
pub struct DieselServiceCommissionRepository {
    pool: DbPool,
}

impl DieselServiceCommissionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ServiceCommissionRepositoryError {
    map_basic_pool_error(error, ServiceCommissionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ServiceCommissionRepositoryError {
    map_basic_diesel_error(
        error,
        ServiceCommissionRepositoryError::query,
        ServiceCommissionRepositoryError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error) -> ServiceCommissionRepositoryError {
    if is_unique_violation(&error) {
        return ServiceCommissionRepositoryError::conflict("a commission is already configured");
    }
    map_diesel_error(error)
}

#[async_trait]
impl ServiceCommissionRepository for DieselServiceCommissionRepository {
    async fn create(
        &self,
        commission: &ServiceCommission,
    ) -> Result<(), ServiceCommissionRepositoryError> {
        let row = ServiceCommissionRow::from(commission);
        within_budget(
            &self.pool,
            "service_commissions.create",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(service_commissions::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_insert_error)
            },
            ServiceCommissionRepositoryError::connection,
        )
        .await
    }

    async fn current(&self) -> Result<Option<ServiceCommission>, ServiceCommissionRepositoryError> {
        within_budget(
            &self.pool,
            "service_commissions.current",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = service_commissions::table
                    .select(ServiceCommissionRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Ok(row.map(ServiceCommission::from))
            },
            ServiceCommissionRepositoryError::connection,
        )
        .await
    }

    async fn update_percentage(
        &self,
        id: Uuid,
        percentage: i32,
        at: DateTime<Utc>,
    ) -> Result<Option<ServiceCommission>, ServiceCommissionRepositoryError> {
        within_budget(
            &self.pool,
            "service_commissions.update_percentage",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = diesel::update(
                    service_commissions::table.filter(service_commissions::id.eq(id)),
                )
                .set((
                    service_commissions::percentage.eq(percentage),
                    service_commissions::updated_at.eq(at),
                ))
                .returning(ServiceCommissionRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
                Ok(row.map(ServiceCommission::from))
            },
            ServiceCommissionRepositoryError::connection,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn second_commission_is_a_conflict() {
        let error = map_insert_error(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("service_commissions_singleton_key".to_owned()),
        ));
        assert!(matches!(
            error,
            ServiceCommissionRepositoryError::Conflict { .. }
        ));
    }

    #[rstest]
    fn check_violations_stay_query_errors() {
        let error = map_insert_error(DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("service_commissions_percentage_check".to_owned()),
        ));
        assert!(matches!(error, ServiceCommissionRepositoryError::Query { .. }));
    }
}

//! PostgreSQL-backed [`ServicePricingRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ServicePricingRepository, ServicePricingRepositoryError};
use crate::domain::{ServicePricing, ServiceType};

use super::diesel_helpers::{
    collect_rows, is_unique_violation, map_basic_diesel_error, map_basic_pool_error, within_budget,
};
use super::models::ServicePricingRow;
use super::pool::{DbPool, PoolError};
use super::schema::service_pricings;

/// Diesel implementation of [`ServicePricingRepository`].
#[derive(Clone)]
pub struct DieselServicePricingRepository {
    pool: DbPool,
}

impl DieselServicePricingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ServicePricingRepositoryError {
    map_basic_pool_error(error, ServicePricingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ServicePricingRepositoryError {
    map_basic_diesel_error(
        error,
        ServicePricingRepositoryError::query,
        ServicePricingRepositoryError::connection,
    )
}

/// Like [`map_diesel_error`] but reports a duplicate service type as a conflict.
fn map_insert_error(error: diesel::result::Error, service_type: ServiceType) -> ServicePricingRepositoryError {
    if is_unique_violation(&error) {
        return ServicePricingRepositoryError::conflict(service_type.as_str());
    }
    map_diesel_error(error)
}

#[async_trait]
impl ServicePricingRepository for DieselServicePricingRepository {
    async fn create(&self, pricing: &ServicePricing) -> Result<(), ServicePricingRepositoryError> {
        let row = ServicePricingRow::from(pricing);
        let service_type = pricing.service_type;
        within_budget(
            &self.pool,
            "service_pricings.create",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(service_pricings::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(|err| map_insert_error(err, service_type))
            },
            ServicePricingRepositoryError::connection,
        )
        .await
    }

    async fn find_by_service_type(
        &self,
        service_type: ServiceType,
    ) -> Result<Option<ServicePricing>, ServicePricingRepositoryError> {
        within_budget(
            &self.pool,
            "service_pricings.find",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = service_pricings::table
                    .filter(service_pricings::service_type.eq(service_type.as_str()))
                    .select(ServicePricingRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(ServicePricingRow::into_domain)
                    .transpose()
                    .map_err(ServicePricingRepositoryError::query)
            },
            ServicePricingRepositoryError::connection,
        )
        .await
    }

    async fn list(&self) -> Result<Vec<ServicePricing>, ServicePricingRepositoryError> {
        within_budget(
            &self.pool,
            "service_pricings.list",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<ServicePricingRow> = service_pricings::table
                    .order(service_pricings::service_type.asc())
                    .select(ServicePricingRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                collect_rows(
                    rows,
                    ServicePricingRow::into_domain,
                    ServicePricingRepositoryError::query,
                )
            },
            ServicePricingRepositoryError::connection,
        )
        .await
    }

    async fn update_rate(
        &self,
        service_type: ServiceType,
        rate_per_hour: f64,
        at: DateTime<Utc>,
    ) -> Result<Option<ServicePricing>, ServicePricingRepositoryError> {
        within_budget(
            &self.pool,
            "service_pricings.update_rate",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = diesel::update(
                    service_pricings::table
                        .filter(service_pricings::service_type.eq(service_type.as_str())),
                )
                .set((
                    service_pricings::rate_per_hour.eq(rate_per_hour),
                    service_pricings::updated_at.eq(at),
                ))
                .returning(ServicePricingRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
                row.map(ServicePricingRow::into_domain)
                    .transpose()
                    .map_err(ServicePricingRepositoryError::query)
            },
            ServicePricingRepositoryError::connection,
        )
        .await
    }

    async fn delete(&self, service_type: ServiceType) -> Result<bool, ServicePricingRepositoryError> {
        within_budget(
            &self.pool,
            "service_pricings.delete",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let deleted = diesel::delete(
                    service_pricings::table
                        .filter(service_pricings::service_type.eq(service_type.as_str())),
                )
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(deleted > 0)
            },
            ServicePricingRepositoryError::connection,
        )
        .await
    }
}

//! PostgreSQL-backed [`ProviderServiceRepository`].
//!
//! Matching filters on the address suffix with `ILIKE` and drops owners who
//! are the provider on any in-progress booking. In-progress bookings always
//! carry a provider, so the `NOT IN` subquery never sees a null.

use async_trait::async_trait;
use diesel::dsl::not;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{MatchCriteria, ProviderServiceRepository, ProviderServiceRepositoryError};
use crate::domain::{BookingStatus, ProviderService, ServiceImage, ServiceType, UserId};

use super::diesel_helpers::{
    collect_rows, escape_like, is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
    within_budget,
};
use super::models::{ProviderServiceRow, ServiceImageRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, provider_services, service_images};

/// Diesel implementation of [`ProviderServiceRepository`].
#[derive(Clone)]
pub struct DieselProviderServiceRepository {
    pool: DbPool,
}

impl DieselProviderServiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProviderServiceRepositoryError {
    map_basic_pool_error(error, ProviderServiceRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProviderServiceRepositoryError {
    map_basic_diesel_error(
        error,
        ProviderServiceRepositoryError::query,
        ProviderServiceRepositoryError::connection,
    )
}

/// `ILIKE` pattern matching addresses that end with `suffix`.
///
/// Wildcards inside the suffix are escaped so they match literally.
fn suffix_pattern(suffix: &str) -> String {
    format!("%{}", escape_like(suffix))
}

#[async_trait]
impl ProviderServiceRepository for DieselProviderServiceRepository {
    async fn create(&self, service: &ProviderService) -> Result<(), ProviderServiceRepositoryError> {
        let row = ProviderServiceRow::from_domain(service).map_err(ProviderServiceRepositoryError::query)?;
        let service_type = service.service_type;
        within_budget(
            &self.pool,
            "provider_services.create",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(provider_services::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(|err| {
                        if is_unique_violation(&err) {
                            ProviderServiceRepositoryError::conflict(service_type.as_str())
                        } else {
                            map_diesel_error(err)
                        }
                    })
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn find(
        &self,
        user_id: &UserId,
        service_type: ServiceType,
    ) -> Result<Option<ProviderService>, ProviderServiceRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "provider_services.find",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = provider_services::table
                    .filter(provider_services::user_id.eq(owner))
                    .filter(provider_services::service_type.eq(service_type.as_str()))
                    .select(ProviderServiceRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(ProviderServiceRow::into_domain)
                    .transpose()
                    .map_err(ProviderServiceRepositoryError::query)
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProviderService>, ProviderServiceRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "provider_services.list_for_user",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<ProviderServiceRow> = provider_services::table
                    .filter(provider_services::user_id.eq(owner))
                    .order(provider_services::service_type.asc())
                    .select(ProviderServiceRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                collect_rows(
                    rows,
                    ProviderServiceRow::into_domain,
                    ProviderServiceRepositoryError::query,
                )
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn update(&self, service: &ProviderService) -> Result<bool, ProviderServiceRepositoryError> {
        let row = ProviderServiceRow::from_domain(service).map_err(ProviderServiceRepositoryError::query)?;
        within_budget(
            &self.pool,
            "provider_services.update",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let updated = diesel::update(
                    provider_services::table
                        .filter(provider_services::id.eq(row.id))
                        .filter(provider_services::user_id.eq(row.user_id)),
                )
                .set((
                    provider_services::description.eq(&row.description),
                    provider_services::rate_per_hour.eq(row.rate_per_hour),
                    provider_services::experience_years.eq(row.experience_years),
                    provider_services::availability.eq(&row.availability),
                    provider_services::address.eq(&row.address),
                    provider_services::updated_at.eq(row.updated_at),
                ))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(updated > 0)
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn delete(
        &self,
        user_id: &UserId,
        service_type: ServiceType,
    ) -> Result<bool, ProviderServiceRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "provider_services.delete",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let deleted = diesel::delete(
                    provider_services::table
                        .filter(provider_services::user_id.eq(owner))
                        .filter(provider_services::service_type.eq(service_type.as_str())),
                )
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(deleted > 0)
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn insert_image(&self, image: &ServiceImage) -> Result<(), ProviderServiceRepositoryError> {
        let row = ServiceImageRow::from(image);
        within_budget(
            &self.pool,
            "service_images.insert",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(service_images::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_diesel_error)
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn list_images(
        &self,
        user_id: &UserId,
        service_type: ServiceType,
    ) -> Result<Vec<ServiceImage>, ProviderServiceRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "service_images.list",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<ServiceImageRow> = service_images::table
                    .filter(service_images::user_id.eq(owner))
                    .filter(service_images::service_type.eq(service_type.as_str()))
                    .order(service_images::created_at.asc())
                    .select(ServiceImageRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                collect_rows(
                    rows,
                    ServiceImageRow::into_domain,
                    ProviderServiceRepositoryError::query,
                )
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn find_image(
        &self,
        user_id: &UserId,
        image_id: Uuid,
    ) -> Result<Option<ServiceImage>, ProviderServiceRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "service_images.find",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = service_images::table
                    .filter(service_images::id.eq(image_id))
                    .filter(service_images::user_id.eq(owner))
                    .select(ServiceImageRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(ServiceImageRow::into_domain)
                    .transpose()
                    .map_err(ProviderServiceRepositoryError::query)
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn delete_image(
        &self,
        user_id: &UserId,
        image_id: Uuid,
    ) -> Result<bool, ProviderServiceRepositoryError> {
        let owner = *user_id.as_uuid();
        within_budget(
            &self.pool,
            "service_images.delete",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let deleted = diesel::delete(
                    service_images::table
                        .filter(service_images::id.eq(image_id))
                        .filter(service_images::user_id.eq(owner)),
                )
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(deleted > 0)
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }

    async fn find_matching(
        &self,
        criteria: &MatchCriteria,
        page: PageRequest,
    ) -> Result<Vec<ProviderService>, ProviderServiceRepositoryError> {
        let pattern = suffix_pattern(&criteria.locality_suffix);
        let requester = *criteria.requester_id.as_uuid();
        let service_type = criteria.service_type;
        within_budget(
            &self.pool,
            "provider_services.find_matching",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let busy = bookings::table
                    .filter(bookings::status.eq(BookingStatus::InProgress.as_str()))
                    .filter(bookings::provider_id.is_not_null())
                    .select(bookings::provider_id);
                let rows: Vec<ProviderServiceRow> = provider_services::table
                    .filter(provider_services::service_type.eq(service_type.as_str()))
                    .filter(provider_services::user_id.ne(requester))
                    .filter(provider_services::address.ilike(&pattern))
                    .filter(not(provider_services::user_id.nullable().eq_any(busy)))
                    .order(provider_services::created_at.asc())
                    .limit(page.limit())
                    .offset(page.offset())
                    .select(ProviderServiceRow::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                collect_rows(
                    rows,
                    ProviderServiceRow::into_domain,
                    ProviderServiceRepositoryError::query,
                )
            },
            ProviderServiceRepositoryError::connection,
        )
        .await
    }
}

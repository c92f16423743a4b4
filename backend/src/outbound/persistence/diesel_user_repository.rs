//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{ProfileUpdate, Role, ServiceRole, User, UserFilter, UserId, UserProfile};

use super::diesel_helpers::{
    collect_rows, escape_like, map_basic_diesel_error, map_basic_pool_error, within_budget,
};
use super::models::{NewUserRow, ProfileChangeset, UserProfileRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape_like(text.trim()))
}

fn into_profile(row: Option<UserProfileRow>) -> Result<Option<UserProfile>, UserPersistenceError> {
    row.map(UserProfileRow::into_domain)
        .transpose()
        .map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let row = NewUserRow::from(user);
        within_budget(
            &self.pool,
            "users.upsert",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into(users::table)
                    .values(&row)
                    .on_conflict(users::id)
                    .do_update()
                    .set((
                        users::email.eq(excluded(users::email)),
                        users::role.eq(excluded(users::role)),
                        users::service_role.eq(excluded(users::service_role)),
                        users::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_diesel_error)
            },
            UserPersistenceError::connection,
        )
        .await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let id = *id.as_uuid();
        within_budget(
            &self.pool,
            "users.find_by_id",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = users::table
                    .filter(users::id.eq(id))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                row.map(UserRow::into_domain)
                    .transpose()
                    .map_err(UserPersistenceError::query)
            },
            UserPersistenceError::connection,
        )
        .await
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, UserPersistenceError> {
        let id = *id.as_uuid();
        within_budget(
            &self.pool,
            "users.find_profile",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = users::table
                    .filter(users::id.eq(id))
                    .select(UserProfileRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                into_profile(row)
            },
            UserPersistenceError::connection,
        )
        .await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let id = *id.as_uuid();
        let changes = ProfileChangeset::new(update, at);
        within_budget(
            &self.pool,
            "users.update_profile",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = diesel::update(users::table.filter(users::id.eq(id)))
                    .set(&changes)
                    .returning(UserProfileRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                into_profile(row)
            },
            UserPersistenceError::connection,
        )
        .await
    }

    async fn set_role(
        &self,
        id: &UserId,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let id = *id.as_uuid();
        within_budget(
            &self.pool,
            "users.set_role",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = diesel::update(users::table.filter(users::id.eq(id)))
                    .set((users::role.eq(role.as_str()), users::updated_at.eq(at)))
                    .returning(UserProfileRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                into_profile(row)
            },
            UserPersistenceError::connection,
        )
        .await
    }

    async fn set_service_role(
        &self,
        id: &UserId,
        service_role: ServiceRole,
        at: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, UserPersistenceError> {
        let id = *id.as_uuid();
        within_budget(
            &self.pool,
            "users.set_service_role",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row = diesel::update(users::table.filter(users::id.eq(id)))
                    .set((
                        users::service_role.eq(service_role.as_str()),
                        users::updated_at.eq(at),
                    ))
                    .returning(UserProfileRow::as_returning())
                    .get_result(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                into_profile(row)
            },
            UserPersistenceError::connection,
        )
        .await
    }

    async fn list_profiles(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, UserPersistenceError> {
        let mut query = users::table
            .select(UserProfileRow::as_select())
            .order((users::created_at.desc(), users::id.asc()))
            .limit(page.limit())
            .offset(page.offset())
            .into_boxed();
        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        if let Some(service_role) = filter.service_role {
            query = query.filter(users::service_role.eq(service_role.as_str()));
        }
        if let Some(email) = &filter.email {
            query = query.filter(users::email.ilike(contains_pattern(email)));
        }
        if let Some(name) = &filter.name {
            let pattern = contains_pattern(name);
            query = query.filter(
                users::first_name
                    .ilike(pattern.clone())
                    .or(users::last_name.ilike(pattern)),
            );
        }

        within_budget(
            &self.pool,
            "users.list_profiles",
            async {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<UserProfileRow> =
                    query.load(&mut conn).await.map_err(map_diesel_error)?;
                collect_rows(rows, UserProfileRow::into_domain, UserPersistenceError::query)
            },
            UserPersistenceError::connection,
        )
        .await
    }
}

//! HTTP handlers for member profiles and roles.
//!
//! ```text
//! GET   /api/v1/users
//! GET   /api/v1/users/profile
//! PATCH /api/v1/users/profile
//! PATCH /api/v1/users/service-role
//! GET   /api/v1/users/{id}/profile
//! PATCH /api/v1/users/{id}/role
//! ```

use actix_web::{get, patch, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, ProfileEdit, Role, ServiceRole, UserFilter, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_optional, parse_role, parse_service_role, parse_user_id,
};

/// A member's profile. Contact fields are omitted for other members.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub service_role: ServiceRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
            role: value.role,
            service_role: value.service_role,
            first_name: value.first_name,
            last_name: value.last_name,
            phone_number: value.phone_number,
            bio: value.bio,
            address: value.address,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// One page of members.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPageResponse {
    pub items: Vec<UserProfileResponse>,
    pub page: u32,
    pub size: u32,
}

impl From<Page<UserProfile>> for UserPageResponse {
    fn from(value: Page<UserProfile>) -> Self {
        let page = value.map(UserProfileResponse::from);
        Self {
            items: page.items,
            page: page.page,
            size: page.size,
        }
    }
}

/// Profile fields to change. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[schema(example = "Okafor")]
    pub last_name: Option<String>,
    #[schema(example = "+2348031234567")]
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    #[schema(example = "12 Allen Avenue, Ikeja, Lagos, Nigeria")]
    pub address: Option<String>,
}

impl From<UpdateProfileBody> for ProfileEdit {
    fn from(value: UpdateProfileBody) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            phone_number: value.phone_number,
            bio: value.bio,
            address: value.address,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetServiceRoleBody {
    /// `service_provider`, `service_requester` or `service_both`.
    #[schema(example = "service_provider")]
    pub service_role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SetRoleBody {
    /// `regular`, `admin` or `admin_super`.
    #[schema(example = "admin")]
    pub role: String,
}

/// Directory filters. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub role: Option<String>,
    pub service_role: Option<String>,
    /// Case-insensitive substring of the email.
    pub email: Option<String>,
    /// Case-insensitive substring of the first or last name.
    pub name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

impl ListUsersQuery {
    fn filter(&self) -> Result<UserFilter, Error> {
        Ok(UserFilter {
            role: parse_optional(self.role.as_deref(), |raw| {
                parse_role(raw, FieldName::new("role"))
            })?,
            service_role: parse_optional(self.service_role.as_deref(), |raw| {
                parse_service_role(raw, FieldName::new("serviceRole"))
            })?,
            email: non_blank(self.email.clone()),
            name: non_blank(self.name.clone()),
        })
    }
}

/// Browse members. Administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Members", body = UserPageResponse),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admins only", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("BearerToken" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<UserPageResponse>> {
    let query = query.into_inner();
    let filter = query.filter()?;
    let page = page_request(PageParams {
        page: query.page,
        size: query.size,
    })?;
    let users = state
        .profiles_query
        .list_users(user.user(), filter, page)
        .await?;
    Ok(web::Json(users.into()))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfileResponse),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["users"],
    operation_id = "getOwnProfile",
    security(("BearerToken" = []))
)]
#[get("/users/profile")]
pub async fn get_own_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let profile = state.profiles_query.own_profile(user.user()).await?;
    Ok(web::Json(profile.into()))
}

/// Edit the caller's own profile.
#[utoipa::path(
    patch,
    path = "/api/v1/users/profile",
    request_body = UpdateProfileBody,
    responses(
        (status = 200, description = "Profile updated", body = UserProfileResponse),
        (status = 400, description = "Invalid field", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateOwnProfile",
    security(("BearerToken" = []))
)]
#[patch("/users/profile")]
pub async fn update_own_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileBody>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let profile = state
        .profiles
        .update_profile(user.user(), payload.into_inner().into())
        .await?;
    Ok(web::Json(profile.into()))
}

/// Switch between providing, requesting, or both.
#[utoipa::path(
    patch,
    path = "/api/v1/users/service-role",
    request_body = SetServiceRoleBody,
    responses(
        (status = 200, description = "Service role changed", body = UserProfileResponse),
        (status = 400, description = "Unknown service role", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["users"],
    operation_id = "setServiceRole",
    security(("BearerToken" = []))
)]
#[patch("/users/service-role")]
pub async fn set_service_role(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<SetServiceRoleBody>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let service_role = parse_service_role(&payload.service_role, FieldName::new("serviceRole"))?;
    let profile = state
        .profiles
        .set_service_role(user.user(), service_role)
        .await?;
    Ok(web::Json(profile.into()))
}

/// Another member's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/profile",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile", body = UserProfileResponse),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserProfile",
    security(("BearerToken" = []))
)]
#[get("/users/{id}/profile")]
pub async fn get_user_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let target = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let profile = state.profiles_query.profile(user.user(), &target).await?;
    Ok(web::Json(profile.into()))
}

/// Change a member's platform role.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = SetRoleBody,
    responses(
        (status = 200, description = "Role changed", body = UserProfileResponse),
        (status = 400, description = "Invalid id or role", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Super admins only", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "setUserRole",
    security(("BearerToken" = []))
)]
#[patch("/users/{id}/role")]
pub async fn set_user_role(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<SetRoleBody>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let target = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let role = parse_role(&payload.role, FieldName::new("role"))?;
    let profile = state
        .profiles
        .set_role(user.user(), &target, role)
        .await?;
    Ok(web::Json(profile.into()))
}

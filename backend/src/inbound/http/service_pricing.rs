//! Admin HTTP handlers for hourly service rates and the platform commission.
//!
//! ```text
//! POST   /api/v1/service-pricing
//! GET    /api/v1/service-pricing
//! POST   /api/v1/service-pricing/commission
//! GET    /api/v1/service-pricing/commission
//! PATCH  /api/v1/service-pricing/commission/{id}
//! GET    /api/v1/service-pricing/{serviceType}
//! PATCH  /api/v1/service-pricing/{serviceType}
//! DELETE /api/v1/service-pricing/{serviceType}
//! ```
//!
//! The commission routes must be registered before the `{serviceType}`
//! routes so `commission` is not parsed as a service type.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, ServiceCommission, ServicePricing, ServiceType};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_service_type, parse_uuid};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePricingBody {
    #[schema(example = "cleaning")]
    pub service_type: String,
    #[schema(example = 5000.0)]
    pub rate_per_hour: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServicePricingBody {
    #[schema(example = 5500.0)]
    pub rate_per_hour: f64,
}

/// Configured hourly rate for one service type.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePricingResponse {
    pub id: Uuid,
    pub service_type: ServiceType,
    pub rate_per_hour: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServicePricing> for ServicePricingResponse {
    fn from(value: ServicePricing) -> Self {
        Self {
            id: value.id,
            service_type: value.service_type,
            rate_per_hour: value.rate_per_hour,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Request body for creating or changing the commission.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CommissionBody {
    /// Whole percentage between 1 and 100.
    #[schema(example = 10)]
    pub percentage: i32,
}

/// Platform commission taken from each booking.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResponse {
    pub id: Uuid,
    pub percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceCommission> for CommissionResponse {
    fn from(value: ServiceCommission) -> Self {
        Self {
            id: value.id,
            percentage: value.percentage,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

fn service_type_from_path(raw: &str) -> Result<ServiceType, Error> {
    parse_service_type(raw, FieldName::new("serviceType"))
}

/// Set the rate for a service type that has none yet.
#[utoipa::path(
    post,
    path = "/api/v1/service-pricing",
    request_body = CreateServicePricingBody,
    responses(
        (status = 201, description = "Rate created", body = ServicePricingResponse),
        (status = 400, description = "Invalid rate or service type", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 409, description = "Rate already exists", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "createServicePricing",
    security(("BearerToken" = []))
)]
#[post("/service-pricing")]
pub async fn create_pricing(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateServicePricingBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let service_type = service_type_from_path(&body.service_type)?;
    let pricing = state
        .pricing
        .create(user.user(), service_type, body.rate_per_hour)
        .await?;
    Ok(HttpResponse::Created().json(ServicePricingResponse::from(pricing)))
}

/// List every configured rate.
#[utoipa::path(
    get,
    path = "/api/v1/service-pricing",
    responses(
        (status = 200, description = "Rates", body = [ServicePricingResponse]),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admins only", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "listServicePricing",
    security(("BearerToken" = []))
)]
#[get("/service-pricing")]
pub async fn list_pricing(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ServicePricingResponse>>> {
    let rates = state.pricing.list(user.user()).await?;
    Ok(web::Json(rates.into_iter().map(Into::into).collect()))
}

/// Configure the commission. Only one may exist.
#[utoipa::path(
    post,
    path = "/api/v1/service-pricing/commission",
    request_body = CommissionBody,
    responses(
        (status = 201, description = "Commission created", body = CommissionResponse),
        (status = 400, description = "Percentage out of range", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Super admins only", body = Error),
        (status = 409, description = "Commission already exists", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "createServiceCommission",
    security(("BearerToken" = []))
)]
#[post("/service-pricing/commission")]
pub async fn create_commission(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CommissionBody>,
) -> ApiResult<HttpResponse> {
    let commission = state
        .commission
        .create(user.user(), payload.percentage)
        .await?;
    Ok(HttpResponse::Created().json(CommissionResponse::from(commission)))
}

#[utoipa::path(
    get,
    path = "/api/v1/service-pricing/commission",
    responses(
        (status = 200, description = "Commission", body = CommissionResponse),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "No commission configured", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "getServiceCommission",
    security(("BearerToken" = []))
)]
#[get("/service-pricing/commission")]
pub async fn get_commission(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<CommissionResponse>> {
    let commission = state.commission.get(user.user()).await?;
    Ok(web::Json(commission.into()))
}

/// Change the commission percentage.
#[utoipa::path(
    patch,
    path = "/api/v1/service-pricing/commission/{id}",
    params(("id" = String, Path, description = "Commission id")),
    request_body = CommissionBody,
    responses(
        (status = 200, description = "Commission updated", body = CommissionResponse),
        (status = 400, description = "Invalid id or percentage", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Super admins only", body = Error),
        (status = 404, description = "Commission not found", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "updateServiceCommission",
    security(("BearerToken" = []))
)]
#[patch("/service-pricing/commission/{id}")]
pub async fn update_commission(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<CommissionBody>,
) -> ApiResult<web::Json<CommissionResponse>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let commission = state
        .commission
        .update(user.user(), id, payload.percentage)
        .await?;
    Ok(web::Json(commission.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/service-pricing/{serviceType}",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    responses(
        (status = 200, description = "Rate", body = ServicePricingResponse),
        (status = 400, description = "Unknown service type", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "No rate configured", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "getServicePricing",
    security(("BearerToken" = []))
)]
#[get("/service-pricing/{service_type}")]
pub async fn get_pricing(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServicePricingResponse>> {
    let service_type = service_type_from_path(&path.into_inner())?;
    let pricing = state.pricing.get(user.user(), service_type).await?;
    Ok(web::Json(pricing.into()))
}

/// Change an existing rate.
#[utoipa::path(
    patch,
    path = "/api/v1/service-pricing/{serviceType}",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    request_body = UpdateServicePricingBody,
    responses(
        (status = 200, description = "Rate updated", body = ServicePricingResponse),
        (status = 400, description = "Invalid rate or service type", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "No rate configured", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "updateServicePricing",
    security(("BearerToken" = []))
)]
#[patch("/service-pricing/{service_type}")]
pub async fn update_pricing(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateServicePricingBody>,
) -> ApiResult<web::Json<ServicePricingResponse>> {
    let service_type = service_type_from_path(&path.into_inner())?;
    let pricing = state
        .pricing
        .update(user.user(), service_type, payload.rate_per_hour)
        .await?;
    Ok(web::Json(pricing.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/service-pricing/{serviceType}",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    responses(
        (status = 204, description = "Rate removed"),
        (status = 400, description = "Unknown service type", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "No rate configured", body = Error)
    ),
    tags = ["service-pricing"],
    operation_id = "deleteServicePricing",
    security(("BearerToken" = []))
)]
#[delete("/service-pricing/{service_type}")]
pub async fn delete_pricing(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let service_type = service_type_from_path(&path.into_inner())?;
    state.pricing.delete(user.user(), service_type).await?;
    Ok(HttpResponse::NoContent().finish())
}

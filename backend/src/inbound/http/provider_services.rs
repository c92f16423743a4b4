//! Provider service offering and gallery handlers.
//!
//! ```text
//! POST   /api/v1/services
//! GET    /api/v1/services
//! GET    /api/v1/users/{id}/services
//! GET    /api/v1/services/{serviceType}
//! PATCH  /api/v1/services/{serviceType}
//! DELETE /api/v1/services/{serviceType}
//! POST   /api/v1/services/{serviceType}/images
//! GET    /api/v1/services/{serviceType}/images
//! DELETE /api/v1/services/{serviceType}/images/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::ImageUpload;
use crate::domain::{
    Address, Availability, Error, ProviderService, ProviderServiceDetails, ServiceImage,
    ServiceType,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_service_type, parse_user_id, parse_uuid,
};

/// Editable offering fields.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderServiceBody {
    pub description: String,
    #[schema(example = 4500.0)]
    pub rate_per_hour: f64,
    pub experience_years: i32,
    #[serde(default)]
    pub availability: Availability,
    #[schema(example = "3 Opebi Road, Ikeja, Lagos, Nigeria")]
    pub address: String,
}

/// Request body for offering a new service type.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProviderServiceBody {
    #[schema(example = "cleaning")]
    pub service_type: String,
    #[serde(flatten)]
    pub details: ProviderServiceBody,
}

/// One offering as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderServiceResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    pub service_type: ServiceType,
    pub description: String,
    pub rate_per_hour: f64,
    pub experience_years: i32,
    pub availability: Availability,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProviderService> for ProviderServiceResponse {
    fn from(value: ProviderService) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            service_type: value.service_type,
            description: value.details.description,
            rate_per_hour: value.details.rate_per_hour,
            experience_years: value.details.experience_years,
            availability: value.details.availability,
            address: value.details.address.into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// One image in an upload batch.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    /// Base64 encoded bytes.
    pub data: String,
}

/// Request body for uploading gallery images.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UploadImagesBody {
    pub images: Vec<ImageBody>,
}

/// Stored gallery image.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceImageResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub service_type: ServiceType,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceImage> for ServiceImageResponse {
    fn from(value: ServiceImage) -> Self {
        Self {
            id: value.id.to_string(),
            service_type: value.service_type,
            url: value.url,
            created_at: value.created_at,
        }
    }
}

fn parse_details(body: ProviderServiceBody) -> Result<ProviderServiceDetails, Error> {
    let address = Address::new(body.address.as_str()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "address",
            "value": body.address,
            "code": "address_too_short",
        }))
    })?;
    Ok(ProviderServiceDetails {
        description: body.description,
        rate_per_hour: body.rate_per_hour,
        experience_years: body.experience_years,
        availability: body.availability,
        address,
    })
}

fn service_type_from_path(raw: &str) -> Result<ServiceType, Error> {
    parse_service_type(raw, FieldName::new("serviceType"))
}

fn to_responses(services: Vec<ProviderService>) -> Vec<ProviderServiceResponse> {
    services.into_iter().map(ProviderServiceResponse::from).collect()
}

/// Offer a new service type as the signed-in provider.
#[utoipa::path(
    post,
    path = "/api/v1/services",
    request_body = CreateProviderServiceBody,
    responses(
        (status = 201, description = "Offering created", body = ProviderServiceResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Requesters cannot offer services", body = Error),
        (status = 409, description = "Service type already offered", body = Error)
    ),
    tags = ["services"],
    operation_id = "createProviderService",
    security(("BearerToken" = []))
)]
#[post("/services")]
pub async fn create_service(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateProviderServiceBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let service_type = parse_service_type(&body.service_type, FieldName::new("serviceType"))?;
    let details = parse_details(body.details)?;
    let created = state
        .catalogue
        .create_service(user.user(), service_type, details)
        .await?;
    Ok(HttpResponse::Created().json(ProviderServiceResponse::from(created)))
}

/// List the signed-in user's offerings.
#[utoipa::path(
    get,
    path = "/api/v1/services",
    responses(
        (status = 200, description = "Own offerings", body = [ProviderServiceResponse]),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["services"],
    operation_id = "listOwnProviderServices",
    security(("BearerToken" = []))
)]
#[get("/services")]
pub async fn list_own_services(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ProviderServiceResponse>>> {
    let services = state.catalogue.list_services(&user.user().id).await?;
    Ok(web::Json(to_responses(services)))
}

/// List another user's offerings.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/services",
    params(("id" = String, Path, description = "Owner user id")),
    responses(
        (status = 200, description = "Offerings", body = [ProviderServiceResponse]),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["services"],
    operation_id = "listUserProviderServices",
    security(("BearerToken" = []))
)]
#[get("/users/{id}/services")]
pub async fn list_user_services(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ProviderServiceResponse>>> {
    let owner = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let services = state.catalogue.list_services(&owner).await?;
    Ok(web::Json(to_responses(services)))
}

/// Fetch one of the signed-in user's offerings.
#[utoipa::path(
    get,
    path = "/api/v1/services/{serviceType}",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    responses(
        (status = 200, description = "Offering", body = ProviderServiceResponse),
        (status = 400, description = "Unknown service type", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not offered", body = Error)
    ),
    tags = ["services"],
    operation_id = "getProviderService",
    security(("BearerToken" = []))
)]
#[get("/services/{service_type}")]
pub async fn get_service(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProviderServiceResponse>> {
    let service_type = service_type_from_path(&path.into_inner())?;
    let service = state.catalogue.get_service(user.user(), service_type).await?;
    Ok(web::Json(service.into()))
}

/// Replace the details of one of the signed-in user's offerings.
#[utoipa::path(
    patch,
    path = "/api/v1/services/{serviceType}",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    request_body = ProviderServiceBody,
    responses(
        (status = 200, description = "Offering updated", body = ProviderServiceResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Requesters cannot offer services", body = Error),
        (status = 404, description = "Not offered", body = Error)
    ),
    tags = ["services"],
    operation_id = "updateProviderService",
    security(("BearerToken" = []))
)]
#[patch("/services/{service_type}")]
pub async fn update_service(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ProviderServiceBody>,
) -> ApiResult<web::Json<ProviderServiceResponse>> {
    let service_type = service_type_from_path(&path.into_inner())?;
    let details = parse_details(payload.into_inner())?;
    let updated = state
        .catalogue
        .update_service(user.user(), service_type, details)
        .await?;
    Ok(web::Json(updated.into()))
}

/// Withdraw one of the signed-in user's offerings.
#[utoipa::path(
    delete,
    path = "/api/v1/services/{serviceType}",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    responses(
        (status = 204, description = "Offering withdrawn"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not offered", body = Error)
    ),
    tags = ["services"],
    operation_id = "deleteProviderService",
    security(("BearerToken" = []))
)]
#[delete("/services/{service_type}")]
pub async fn delete_service(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let service_type = service_type_from_path(&path.into_inner())?;
    state.catalogue.delete_service(user.user(), service_type).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Upload gallery images for one of the signed-in user's offerings.
#[utoipa::path(
    post,
    path = "/api/v1/services/{serviceType}/images",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    request_body = UploadImagesBody,
    responses(
        (status = 201, description = "Images stored", body = [ServiceImageResponse]),
        (status = 400, description = "Invalid batch", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Not offered", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["services"],
    operation_id = "uploadServiceImages",
    security(("BearerToken" = []))
)]
#[post("/services/{service_type}/images")]
pub async fn upload_images(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UploadImagesBody>,
) -> ApiResult<HttpResponse> {
    let service_type = service_type_from_path(&path.into_inner())?;
    let uploads = payload
        .into_inner()
        .images
        .into_iter()
        .map(|image| ImageUpload {
            content_type: image.content_type,
            data: image.data,
        })
        .collect();
    let stored = state
        .catalogue
        .upload_images(user.user(), service_type, uploads)
        .await?;
    let body: Vec<ServiceImageResponse> = stored.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Created().json(body))
}

/// List gallery images of one of the signed-in user's offerings.
#[utoipa::path(
    get,
    path = "/api/v1/services/{serviceType}/images",
    params(("serviceType" = String, Path, description = "cleaning, plumbing or cooking")),
    responses(
        (status = 200, description = "Gallery", body = [ServiceImageResponse]),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["services"],
    operation_id = "listServiceImages",
    security(("BearerToken" = []))
)]
#[get("/services/{service_type}/images")]
pub async fn list_images(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ServiceImageResponse>>> {
    let service_type = service_type_from_path(&path.into_inner())?;
    let images = state.catalogue.list_images(user.user(), service_type).await?;
    Ok(web::Json(images.into_iter().map(Into::into).collect()))
}

/// Delete one gallery image.
#[utoipa::path(
    delete,
    path = "/api/v1/services/{serviceType}/images/{id}",
    params(
        ("serviceType" = String, Path, description = "cleaning, plumbing or cooking"),
        ("id" = String, Path, description = "Image id")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Image not found", body = Error)
    ),
    tags = ["services"],
    operation_id = "deleteServiceImage",
    security(("BearerToken" = []))
)]
#[delete("/services/{service_type}/images/{id}")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_type, raw_id) = path.into_inner();
    service_type_from_path(&raw_type)?;
    let image_id = parse_uuid(&raw_id, FieldName::new("id"))?;
    state.catalogue.delete_image(user.user(), image_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

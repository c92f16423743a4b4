//! Booking lifecycle HTTP handlers.
//!
//! ```text
//! POST  /api/v1/bookings
//! GET   /api/v1/bookings
//! GET   /api/v1/bookings/{id}
//! PATCH /api/v1/bookings/{id}/status
//! PATCH /api/v1/bookings/{id}/accept
//! PATCH /api/v1/bookings/{id}/reject
//! GET   /api/v1/bookings/{id}/providers
//! PUT   /api/v1/bookings/{id}/provider
//! ```

use actix_web::{HttpResponse, get, patch, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{BookingFilter, CreateBookingRequest, ProviderMatch};
use crate::domain::{
    Booking, BookingStatus, BookingType, Error, Invitation, InvitationStatus, ServiceType,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::provider_services::ProviderServiceResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_booking_status, parse_booking_type, parse_date,
    parse_optional, parse_service_type, parse_user_id, parse_uuid,
};

/// Request body for creating a booking. Every field is required.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookingBody {
    #[schema(example = "12 Allen Avenue, Ikeja, Lagos, Nigeria")]
    pub address: String,
    #[schema(example = "cleaning")]
    pub service_type: String,
    #[schema(example = "instant")]
    pub booking_type: String,
    pub description: String,
    #[schema(example = "2026-03-02")]
    pub start_date: String,
    #[schema(example = "2026-03-02")]
    pub end_date: String,
    #[schema(example = "10:00:00Z")]
    pub start_time: String,
    #[schema(example = "12:00:00Z")]
    pub end_time: String,
}

impl From<CreateBookingBody> for CreateBookingRequest {
    fn from(value: CreateBookingBody) -> Self {
        Self {
            address: value.address,
            service_type: value.service_type,
            booking_type: value.booking_type,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            start_time: value.start_time,
            end_time: value.end_time,
        }
    }
}

/// A booking as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub requester_id: String,
    #[schema(format = "uuid")]
    pub provider_id: Option<String>,
    pub address: String,
    pub service_type: ServiceType,
    pub booking_type: BookingType,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: f64,
    pub actual_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let schedule = *value.schedule();
        Self {
            id: value.id().to_string(),
            requester_id: value.requester_id().to_string(),
            provider_id: value.provider_id().map(ToString::to_string),
            address: value.address().as_str().to_owned(),
            service_type: value.service_type(),
            booking_type: value.booking_type(),
            description: value.description().to_owned(),
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            total_price: value.total_price(),
            actual_price: value.actual_price(),
            status: value.status(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// One page of bookings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingPageResponse {
    pub items: Vec<BookingResponse>,
    pub page: u32,
    pub size: u32,
}

impl From<Page<Booking>> for BookingPageResponse {
    fn from(value: Page<Booking>) -> Self {
        let page = value.map(BookingResponse::from);
        Self {
            items: page.items,
            page: page.page,
            size: page.size,
        }
    }
}

/// Query parameters for listing bookings. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBookingsQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub requester_id: Option<String>,
    pub provider_id: Option<String>,
    pub service_type: Option<String>,
    pub booking_type: Option<String>,
    pub status: Option<String>,
    /// Earliest start date, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Latest end date, `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

impl ListBookingsQuery {
    fn filter(&self) -> Result<BookingFilter, Error> {
        Ok(BookingFilter {
            participant: None,
            requester_id: parse_optional(self.requester_id.as_deref(), |raw| {
                parse_user_id(raw, FieldName::new("requesterId"))
            })?,
            provider_id: parse_optional(self.provider_id.as_deref(), |raw| {
                parse_user_id(raw, FieldName::new("providerId"))
            })?,
            service_type: parse_optional(self.service_type.as_deref(), |raw| {
                parse_service_type(raw, FieldName::new("serviceType"))
            })?,
            booking_type: parse_optional(self.booking_type.as_deref(), |raw| {
                parse_booking_type(raw, FieldName::new("bookingType"))
            })?,
            status: parse_optional(self.status.as_deref(), |raw| {
                parse_booking_status(raw, FieldName::new("status"))
            })?,
            start_date: parse_optional(self.start_date.as_deref(), |raw| {
                parse_date(raw, FieldName::new("startDate"))
            })?,
            end_date: parse_optional(self.end_date.as_deref(), |raw| {
                parse_date(raw, FieldName::new("endDate"))
            })?,
        })
    }
}

/// Query parameters for paged sub-resources.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl From<PageQuery> for PageParams {
    fn from(value: PageQuery) -> Self {
        Self {
            page: value.page,
            size: value.size,
        }
    }
}

/// Request body for completing or canceling a booking.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusBody {
    #[schema(example = "completed")]
    pub status: String,
}

/// Request body for inviting a provider.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectProviderBody {
    #[schema(format = "uuid")]
    pub provider_id: String,
}

/// Invitation returned by provider selection.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    #[schema(format = "uuid")]
    pub booking_id: String,
    #[schema(format = "uuid")]
    pub provider_id: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationResponse {
    fn from(value: Invitation) -> Self {
        Self {
            booking_id: value.booking_id.to_string(),
            provider_id: value.invitee_id.to_string(),
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// A candidate provider with travel estimates to the booking address.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProviderMatchResponse {
    pub service: ProviderServiceResponse,
    #[schema(example = "2.4 km")]
    pub distance: String,
    #[schema(example = "9 mins")]
    pub duration: String,
}

impl From<ProviderMatch> for ProviderMatchResponse {
    fn from(value: ProviderMatch) -> Self {
        Self {
            service: value.service.into(),
            distance: value.distance,
            duration: value.duration,
        }
    }
}

/// One page of candidate providers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProviderMatchPageResponse {
    pub items: Vec<ProviderMatchResponse>,
    pub page: u32,
    pub size: u32,
}

fn booking_id(raw: &str) -> Result<Uuid, Error> {
    parse_uuid(raw, FieldName::new("id"))
}

/// Create an open booking priced from the service rate.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingBody,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Providers cannot create bookings", body = Error),
        (status = 404, description = "No pricing for the service type", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "createBooking",
    security(("BearerToken" = []))
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateBookingBody>,
) -> ApiResult<HttpResponse> {
    let booking = state
        .bookings
        .create_booking(user.user(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(BookingResponse::from(booking)))
}

/// List bookings visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Bookings", body = BookingPageResponse),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "listBookings",
    security(("BearerToken" = []))
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ListBookingsQuery>,
) -> ApiResult<web::Json<BookingPageResponse>> {
    let query = query.into_inner();
    let filter = query.filter()?;
    let page = page_request(PageParams {
        page: query.page,
        size: query.size,
    })?;
    let bookings = state
        .bookings_query
        .list_bookings(user.user(), filter, page)
        .await?;
    Ok(web::Json(bookings.into()))
}

/// Fetch one booking.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking", body = BookingResponse),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Booking not found", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "getBooking",
    security(("BearerToken" = []))
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingResponse>> {
    let id = booking_id(&path.into_inner())?;
    let booking = state.bookings_query.get_booking(user.user(), id).await?;
    Ok(web::Json(booking.into()))
}

/// Complete or cancel a booking.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking id")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Booking updated", body = BookingResponse),
        (status = 400, description = "Unsupported status or not yet due", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not allowed in the current state", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 409, description = "Booking changed concurrently", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "updateBookingStatus",
    security(("BearerToken" = []))
)]
#[patch("/bookings/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusBody>,
) -> ApiResult<web::Json<BookingResponse>> {
    let id = booking_id(&path.into_inner())?;
    let status = parse_booking_status(&payload.status, FieldName::new("status"))?;
    let booking = state
        .bookings
        .update_status(user.user(), id, status)
        .await?;
    Ok(web::Json(booking.into()))
}

/// Accept an invitation to an open booking.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/accept",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking in progress", body = BookingResponse),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not invited or booking closed", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 409, description = "Another provider accepted first", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "acceptBooking",
    security(("BearerToken" = []))
)]
#[patch("/bookings/{id}/accept")]
pub async fn accept_booking(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingResponse>> {
    let id = booking_id(&path.into_inner())?;
    let booking = state.bookings.accept(user.user(), id).await?;
    Ok(web::Json(booking.into()))
}

/// Decline an invitation to an open booking.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/reject",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Invitation declined", body = BookingResponse),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not invited or booking closed", body = Error),
        (status = 404, description = "Booking not found", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "rejectBooking",
    security(("BearerToken" = []))
)]
#[patch("/bookings/{id}/reject")]
pub async fn reject_booking(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingResponse>> {
    let id = booking_id(&path.into_inner())?;
    let booking = state.bookings.reject(user.user(), id).await?;
    Ok(web::Json(booking.into()))
}

/// Nearby providers offering the booking's service type.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}/providers",
    params(("id" = String, Path, description = "Booking id"), PageQuery),
    responses(
        (status = 200, description = "Candidate providers", body = ProviderMatchPageResponse),
        (status = 400, description = "Invalid booking address", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the requester or booking closed", body = Error),
        (status = 404, description = "Booking not found", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "findProviders",
    security(("BearerToken" = []))
)]
#[get("/bookings/{id}/providers")]
pub async fn find_providers(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ProviderMatchPageResponse>> {
    let id = booking_id(&path.into_inner())?;
    let page = page_request(query.into_inner().into())?;
    let matches = state
        .matching
        .find_providers(user.user(), id, page)
        .await?
        .map(ProviderMatchResponse::from);
    Ok(web::Json(ProviderMatchPageResponse {
        items: matches.items,
        page: matches.page,
        size: matches.size,
    }))
}

/// Invite a provider to an open booking.
#[utoipa::path(
    put,
    path = "/api/v1/bookings/{id}/provider",
    params(("id" = String, Path, description = "Booking id")),
    request_body = SelectProviderBody,
    responses(
        (status = 200, description = "Provider invited", body = InvitationResponse),
        (status = 400, description = "Invalid provider id", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Not the requester or booking closed", body = Error),
        (status = 404, description = "Booking or provider not found", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "selectProvider",
    security(("BearerToken" = []))
)]
#[put("/bookings/{id}/provider")]
pub async fn select_provider(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<SelectProviderBody>,
) -> ApiResult<web::Json<InvitationResponse>> {
    let id = booking_id(&path.into_inner())?;
    let provider_id = parse_user_id(&payload.provider_id, FieldName::new("providerId"))?;
    let invitation = state
        .bookings
        .select_provider(user.user(), id, &provider_id)
        .await?;
    Ok(web::Json(invitation.into()))
}

#[cfg(test)]
#[path = "bookings_tests.rs"]
mod tests;

//! Notification inbox HTTP handlers.
//!
//! ```text
//! GET   /api/v1/notifications
//! GET   /api/v1/notifications/count
//! PATCH /api/v1/notifications/read
//! PATCH /api/v1/notifications/{id}/read
//! ```

use actix_web::{HttpResponse, get, patch, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::NotificationFilter;
use crate::domain::{Error, Notification, NotificationKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_notification_kind, parse_optional, parse_uuid,
};

/// Inbox entry as returned to its owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub booking_id: Option<Uuid>,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            booking_id: value.booking_id,
            message: value.message,
            seen: value.seen,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationPageResponse {
    pub items: Vec<NotificationResponse>,
    pub page: u32,
    pub size: u32,
}

impl From<Page<Notification>> for NotificationPageResponse {
    fn from(value: Page<Notification>) -> Self {
        let page = value.map(NotificationResponse::from);
        Self {
            items: page.items,
            page: page.page,
            size: page.size,
        }
    }
}

/// Inbox filters. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// `booking` or `payment`.
    pub kind: Option<String>,
    pub booking_id: Option<String>,
    pub seen: Option<bool>,
}

impl ListNotificationsQuery {
    fn filter(&self) -> Result<NotificationFilter, Error> {
        Ok(NotificationFilter {
            kind: parse_optional(self.kind.as_deref(), |raw| {
                parse_notification_kind(raw, FieldName::new("kind"))
            })?,
            booking_id: parse_optional(self.booking_id.as_deref(), |raw| {
                parse_uuid(raw, FieldName::new("bookingId"))
            })?,
            seen: self.seen,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct UnseenCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    /// Number of entries that changed from unseen to seen.
    pub updated: u64,
}

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(ListNotificationsQuery),
    responses(
        (status = 200, description = "Notifications", body = NotificationPageResponse),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications",
    security(("BearerToken" = []))
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<ListNotificationsQuery>,
) -> ApiResult<web::Json<NotificationPageResponse>> {
    let query = query.into_inner();
    let filter = query.filter()?;
    let page = page_request(PageParams {
        page: query.page,
        size: query.size,
    })?;
    let notifications = state.notifications.list(user.user(), filter, page).await?;
    Ok(web::Json(notifications.into()))
}

/// Count unseen notifications.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/count",
    responses(
        (status = 200, description = "Unseen count", body = UnseenCountResponse),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "countUnseenNotifications",
    security(("BearerToken" = []))
)]
#[get("/notifications/count")]
pub async fn count_unseen(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<UnseenCountResponse>> {
    let count = state.notifications.count_unseen(user.user()).await?;
    Ok(web::Json(UnseenCountResponse { count }))
}

/// Mark every notification as seen.
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/read",
    responses(
        (status = 200, description = "Entries marked", body = MarkAllReadResponse),
        (status = 401, description = "Unauthorized", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead",
    security(("BearerToken" = []))
)]
#[patch("/notifications/read")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    let updated = state.notifications.mark_all_read(user.user()).await?;
    Ok(web::Json(MarkAllReadResponse { updated }))
}

/// Mark one notification as seen.
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Marked"),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 404, description = "Notification not found", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead",
    security(("BearerToken" = []))
)]
#[patch("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.notifications.mark_read(user.user(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use mockall::predicate::{always, eq};
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::MockNotificationInbox;
    use crate::inbound::http::test_utils::{bearer, test_state};

    fn app_state(inbox: MockNotificationInbox) -> HttpState {
        HttpState {
            notifications: Arc::new(inbox),
            ..test_state()
        }
    }

    #[actix_web::test]
    async fn list_applies_kind_and_seen_filters() {
        let mut inbox = MockNotificationInbox::new();
        inbox
            .expect_list()
            .withf(|_, filter, page| {
                filter.kind == Some(NotificationKind::Payment)
                    && filter.seen == Some(false)
                    && filter.booking_id.is_none()
                    && page.page() == 2
            })
            .times(1)
            .return_once(|_, _, page| Ok(Page::new(Vec::new(), page)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(inbox)))
                .service(web::scope("/api/v1").service(list_notifications)),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/notifications?kind=payment&seen=false&bookingId=&page=2")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["page"], 2);
    }

    #[actix_web::test]
    async fn unknown_kind_is_rejected() {
        let mut inbox = MockNotificationInbox::new();
        inbox.expect_list().times(0);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(inbox)))
                .service(web::scope("/api/v1").service(list_notifications)),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/notifications?kind=email")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], "unknown_notification_kind");
    }

    #[actix_web::test]
    async fn count_route_is_not_shadowed_by_id_route() {
        let mut inbox = MockNotificationInbox::new();
        inbox.expect_count_unseen().return_once(|_| Ok(3));
        inbox.expect_mark_all_read().return_once(|_| Ok(3));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(inbox)))
                .service(
                    web::scope("/api/v1")
                        .service(count_unseen)
                        .service(mark_all_read)
                        .service(mark_read),
                ),
        )
        .await;

        let count = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/notifications/count")
                .insert_header(bearer())
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(count).await;
        assert_eq!(body["count"], 3);

        let all = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/v1/notifications/read")
                .insert_header(bearer())
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(all).await;
        assert_eq!(body["updated"], 3);
    }

    #[actix_web::test]
    async fn mark_read_returns_no_content() {
        let id = Uuid::new_v4();
        let mut inbox = MockNotificationInbox::new();
        inbox
            .expect_mark_read()
            .with(always(), eq(id))
            .times(1)
            .return_once(|_, _| Ok(()));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(inbox)))
                .service(web::scope("/api/v1").service(mark_read)),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/notifications/{id}/read"))
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}

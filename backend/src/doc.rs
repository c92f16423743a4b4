//! OpenAPI document for the marketplace API.
//!
//! [`ApiDoc`] aggregates every handler annotated with `#[utoipa::path]` and
//! registers the bearer token scheme. Swagger UI serves it in debug builds
//! and `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Availability, BookingStatus, BookingType, Error, ErrorCode, InvitationStatus,
    NotificationKind, Role, ServiceRole, ServiceType, TimeRange,
};
use crate::inbound::http::bookings::{
    BookingPageResponse, BookingResponse, CreateBookingBody, InvitationResponse,
    ProviderMatchPageResponse, ProviderMatchResponse, SelectProviderBody, UpdateStatusBody,
};
use crate::inbound::http::health::HealthBody;
use crate::inbound::http::notifications::{
    MarkAllReadResponse, NotificationPageResponse, NotificationResponse, UnseenCountResponse,
};
use crate::inbound::http::payments::{
    InitializePaymentBody, InitializePaymentResponseBody, PayoutRecipientBody,
    PayoutRecipientResponse, VerifyPaymentBody, VerifyPaymentResponseBody, WalletResponse,
};
use crate::inbound::http::provider_services::{
    CreateProviderServiceBody, ImageBody, ProviderServiceBody, ProviderServiceResponse,
    ServiceImageResponse, UploadImagesBody,
};
use crate::inbound::http::service_pricing::{
    CommissionBody, CommissionResponse, CreateServicePricingBody, ServicePricingResponse,
    UpdateServicePricingBody,
};
use crate::inbound::http::users::{
    SetRoleBody, SetServiceRoleBody, UpdateProfileBody, UserPageResponse, UserProfileResponse,
};

/// Adds the `BearerToken` scheme referenced by the handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Opaque token issued with the issue-token tool."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Marketplace backend API",
        description = "Bookings, provider matching, payments and notifications for a home services marketplace."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::update_status,
        crate::inbound::http::bookings::accept_booking,
        crate::inbound::http::bookings::reject_booking,
        crate::inbound::http::bookings::find_providers,
        crate::inbound::http::bookings::select_provider,
        crate::inbound::http::payments::initialize_payment,
        crate::inbound::http::payments::verify_payment,
        crate::inbound::http::payments::get_wallet,
        crate::inbound::http::payments::register_payout_recipient,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::count_unseen,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::service_pricing::create_pricing,
        crate::inbound::http::service_pricing::list_pricing,
        crate::inbound::http::service_pricing::create_commission,
        crate::inbound::http::service_pricing::get_commission,
        crate::inbound::http::service_pricing::update_commission,
        crate::inbound::http::service_pricing::get_pricing,
        crate::inbound::http::service_pricing::update_pricing,
        crate::inbound::http::service_pricing::delete_pricing,
        crate::inbound::http::provider_services::create_service,
        crate::inbound::http::provider_services::list_own_services,
        crate::inbound::http::provider_services::list_user_services,
        crate::inbound::http::provider_services::get_service,
        crate::inbound::http::provider_services::update_service,
        crate::inbound::http::provider_services::delete_service,
        crate::inbound::http::provider_services::upload_images,
        crate::inbound::http::provider_services::list_images,
        crate::inbound::http::provider_services::delete_image,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_own_profile,
        crate::inbound::http::users::update_own_profile,
        crate::inbound::http::users::set_service_role,
        crate::inbound::http::users::get_user_profile,
        crate::inbound::http::users::set_user_role,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        BookingStatus,
        BookingType,
        ServiceType,
        InvitationStatus,
        NotificationKind,
        Availability,
        TimeRange,
        CreateBookingBody,
        BookingResponse,
        BookingPageResponse,
        UpdateStatusBody,
        SelectProviderBody,
        InvitationResponse,
        ProviderMatchResponse,
        ProviderMatchPageResponse,
        InitializePaymentBody,
        InitializePaymentResponseBody,
        VerifyPaymentBody,
        VerifyPaymentResponseBody,
        WalletResponse,
        PayoutRecipientBody,
        PayoutRecipientResponse,
        NotificationResponse,
        NotificationPageResponse,
        UnseenCountResponse,
        MarkAllReadResponse,
        CreateServicePricingBody,
        UpdateServicePricingBody,
        ServicePricingResponse,
        CommissionBody,
        CommissionResponse,
        Role,
        ServiceRole,
        UserProfileResponse,
        UserPageResponse,
        UpdateProfileBody,
        SetServiceRoleBody,
        SetRoleBody,
        ProviderServiceBody,
        CreateProviderServiceBody,
        ProviderServiceResponse,
        ImageBody,
        UploadImagesBody,
        ServiceImageResponse,
        HealthBody,
    )),
    tags(
        (name = "bookings", description = "Booking lifecycle and provider matching"),
        (name = "payments", description = "Checkout, verification, wallets and payouts"),
        (name = "notifications", description = "Per-user notification inbox"),
        (name = "service-pricing", description = "Hourly rates per service type and the platform commission"),
        (name = "users", description = "Member profiles and roles"),
        (name = "services", description = "Provider offerings and their images"),
        (name = "health", description = "Readiness and liveness checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_exposes_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error, "code");
        assert_object_schema_has_field(error, "message");
    }

    #[rstest]
    #[case("/api/v1/bookings")]
    #[case("/api/v1/bookings/{id}/providers")]
    #[case("/api/v1/payments/initialize")]
    #[case("/api/v1/notifications/count")]
    #[case("/api/v1/service-pricing/{serviceType}")]
    #[case("/api/v1/service-pricing/commission/{id}")]
    #[case("/api/v1/users/{id}/role")]
    #[case("/health/ready")]
    fn document_lists_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}

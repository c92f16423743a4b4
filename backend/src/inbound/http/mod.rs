//! HTTP inbound adapter exposing the marketplace REST API.
//!
//! Handlers stay thin: they authenticate the caller, parse path and query
//! strings into domain types, and delegate to the driving ports held in
//! [`state::HttpState`].

pub mod auth;
pub mod bookings;
pub mod error;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod provider_services;
pub mod service_pricing;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every authenticated API route on `cfg`.
///
/// Mount under `/api/v1`. Static segments are registered before their
/// `{id}` siblings so `/notifications/count` is not captured as an id and
/// `/service-pricing/commission` is not read as a service type.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(bookings::create_booking)
        .service(bookings::list_bookings)
        .service(bookings::get_booking)
        .service(bookings::update_status)
        .service(bookings::accept_booking)
        .service(bookings::reject_booking)
        .service(bookings::find_providers)
        .service(bookings::select_provider)
        .service(payments::initialize_payment)
        .service(payments::verify_payment)
        .service(payments::get_wallet)
        .service(payments::register_payout_recipient)
        .service(notifications::list_notifications)
        .service(notifications::count_unseen)
        .service(notifications::mark_all_read)
        .service(notifications::mark_read)
        .service(service_pricing::create_pricing)
        .service(service_pricing::list_pricing)
        .service(service_pricing::create_commission)
        .service(service_pricing::get_commission)
        .service(service_pricing::update_commission)
        .service(service_pricing::get_pricing)
        .service(service_pricing::update_pricing)
        .service(service_pricing::delete_pricing)
        .service(provider_services::create_service)
        .service(provider_services::list_own_services)
        .service(provider_services::list_user_services)
        .service(provider_services::get_service)
        .service(provider_services::update_service)
        .service(provider_services::delete_service)
        .service(provider_services::upload_images)
        .service(provider_services::list_images)
        .service(provider_services::delete_image)
        .service(users::list_users)
        .service(users::get_own_profile)
        .service(users::update_own_profile)
        .service(users::set_service_role)
        .service(users::get_user_profile)
        .service(users::set_user_role);
}

//! Builders for the HTTP state from repositories and outbound adapters.
//!
//! The same services are wired in both modes; only the repositories change.
//! With a pool they are Diesel-backed, otherwise fixtures stand in.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use marketplace::domain::ports::{
    BookingRepository, FixtureBookingRepository, FixtureNotificationRepository,
    FixturePaymentRepository, FixtureProviderServiceRepository,
    FixtureServiceCommissionRepository, FixtureServicePricingRepository, FixtureTokenVerifier,
    FixtureUserRepository, NotificationRepository, PaymentRepository, ProviderServiceRepository,
    ServiceCommissionRepository, ServicePricingRepository, TokenVerifier, UserRepository,
};
use marketplace::domain::{
    BookingService, NotificationService, PaymentService, ProviderCatalogueService,
    ProviderMatchingService, ServiceCommissionService, ServicePricingService, UserService,
};
use marketplace::inbound::http::state::HttpState;
use marketplace::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselNotificationRepository, DieselPaymentRepository,
    DieselProviderServiceRepository, DieselServiceCommissionRepository,
    DieselServicePricingRepository, DieselTokenStore, DieselUserRepository,
};

use super::ServerConfig;
use super::adapters::OutboundAdapters;

/// Driven persistence ports shared by the domain services.
struct Repositories<B, Pr, C, U, N, Pa, S> {
    tokens: Arc<dyn TokenVerifier>,
    bookings: Arc<B>,
    pricing: Arc<Pr>,
    commission: Arc<C>,
    users: Arc<U>,
    notifications: Arc<N>,
    payments: Arc<Pa>,
    services: Arc<S>,
}

type DieselRepositories = Repositories<
    DieselBookingRepository,
    DieselServicePricingRepository,
    DieselServiceCommissionRepository,
    DieselUserRepository,
    DieselNotificationRepository,
    DieselPaymentRepository,
    DieselProviderServiceRepository,
>;

type FixtureRepositories = Repositories<
    FixtureBookingRepository,
    FixtureServicePricingRepository,
    FixtureServiceCommissionRepository,
    FixtureUserRepository,
    FixtureNotificationRepository,
    FixturePaymentRepository,
    FixtureProviderServiceRepository,
>;

fn diesel_repositories(pool: &DbPool) -> DieselRepositories {
    Repositories {
        tokens: Arc::new(DieselTokenStore::new(pool.clone())),
        bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
        pricing: Arc::new(DieselServicePricingRepository::new(pool.clone())),
        commission: Arc::new(DieselServiceCommissionRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        payments: Arc::new(DieselPaymentRepository::new(pool.clone())),
        services: Arc::new(DieselProviderServiceRepository::new(pool.clone())),
    }
}

fn fixture_repositories() -> FixtureRepositories {
    Repositories {
        tokens: Arc::new(FixtureTokenVerifier),
        bookings: Arc::new(FixtureBookingRepository),
        pricing: Arc::new(FixtureServicePricingRepository),
        commission: Arc::new(FixtureServiceCommissionRepository),
        users: Arc::new(FixtureUserRepository),
        notifications: Arc::new(FixtureNotificationRepository),
        payments: Arc::new(FixturePaymentRepository),
        services: Arc::new(FixtureProviderServiceRepository),
    }
}

fn wire_services<B, Pr, C, U, N, Pa, S>(
    repos: Repositories<B, Pr, C, U, N, Pa, S>,
    adapters: OutboundAdapters,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    B: BookingRepository + 'static,
    Pr: ServicePricingRepository + 'static,
    C: ServiceCommissionRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationRepository + 'static,
    Pa: PaymentRepository + 'static,
    S: ProviderServiceRepository + 'static,
{
    let Repositories {
        tokens,
        bookings,
        pricing,
        commission,
        users,
        notifications,
        payments,
        services,
    } = repos;
    let OutboundAdapters {
        gateway,
        estimator,
        storage,
    } = adapters;

    let booking_service = Arc::new(BookingService::new(
        bookings.clone(),
        pricing.clone(),
        users.clone(),
        clock.clone(),
    ));

    let user_service = Arc::new(UserService::new(users.clone(), clock.clone()));

    HttpState {
        tokens,
        users,
        profiles: user_service.clone(),
        profiles_query: user_service,
        bookings: booking_service.clone(),
        bookings_query: booking_service,
        matching: Arc::new(ProviderMatchingService::new(
            bookings.clone(),
            services.clone(),
            estimator,
        )),
        payments: Arc::new(PaymentService::new(bookings, payments, gateway, clock.clone())),
        notifications: Arc::new(NotificationService::new(notifications)),
        pricing: Arc::new(ServicePricingService::new(pricing, clock.clone())),
        commission: Arc::new(ServiceCommissionService::new(commission, clock.clone())),
        catalogue: Arc::new(ProviderCatalogueService::new(services, storage, clock)),
    }
}

/// Build the handler state for `config`.
///
/// Without a pool every repository is a fixture and the server runs in
/// development mode.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let adapters = config.adapters.clone();
    let state = match &config.db_pool {
        Some(pool) => wire_services(diesel_repositories(pool), adapters, clock),
        None => {
            warn!("no database configured; serving fixture repositories");
            wire_services(fixture_repositories(), adapters, clock)
        }
    };
    web::Data::new(state)
}

#[cfg(test)]
mod tests {
    //! Wiring checks for development mode.

    use super::*;
    use std::net::SocketAddr;

    use marketplace::domain::ports::{FIXTURE_TOKEN, FIXTURE_USER_ID};

    #[tokio::test]
    async fn development_mode_accepts_the_fixture_token() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("literal address");
        let config = ServerConfig::new(addr);

        let state = build_http_state(&config);
        let user_id = state
            .tokens
            .verify(FIXTURE_TOKEN)
            .await
            .expect("fixture verifier")
            .expect("known token");

        assert_eq!(user_id.as_ref(), FIXTURE_USER_ID);
    }
}

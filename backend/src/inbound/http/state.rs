//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised against fixtures or mocks without any I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCommand, BookingQuery, FixtureBookingCommand, FixtureBookingQuery,
    FixtureNotificationInbox, FixturePaymentCommand, FixtureProviderCatalogueCommand,
    FixtureServiceCommissionCommand, FixtureServicePricingCommand, FixtureTokenVerifier,
    FixtureUserCommand, FixtureUserRepository, NotificationInbox, PaymentCommand,
    ProviderCatalogueCommand, ProviderMatchingQuery, ServiceCommissionCommand,
    ServicePricingCommand, TokenVerifier, UserCommand, UserQuery, UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Resolves bearer tokens for [`super::auth::AuthenticatedUser`].
    pub tokens: Arc<dyn TokenVerifier>,
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn UserCommand>,
    pub profiles_query: Arc<dyn UserQuery>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub matching: Arc<dyn ProviderMatchingQuery>,
    pub payments: Arc<dyn PaymentCommand>,
    pub notifications: Arc<dyn NotificationInbox>,
    pub pricing: Arc<dyn ServicePricingCommand>,
    pub commission: Arc<dyn ServiceCommissionCommand>,
    pub catalogue: Arc<dyn ProviderCatalogueCommand>,
}

impl Default for HttpState {
    /// Every port backed by its fixture implementation.
    ///
    /// # Examples
    /// ```
    /// use marketplace::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::default();
    /// let _bookings = state.bookings.clone();
    /// ```
    fn default() -> Self {
        Self {
            tokens: Arc::new(FixtureTokenVerifier),
            users: Arc::new(FixtureUserRepository),
            profiles: Arc::new(FixtureUserCommand),
            profiles_query: Arc::new(FixtureUserCommand),
            bookings: Arc::new(FixtureBookingCommand),
            bookings_query: Arc::new(FixtureBookingQuery),
            matching: Arc::new(FixtureBookingQuery),
            payments: Arc::new(FixturePaymentCommand),
            notifications: Arc::new(FixtureNotificationInbox),
            pricing: Arc::new(FixtureServicePricingCommand),
            commission: Arc::new(FixtureServiceCommissionCommand),
            catalogue: Arc::new(FixtureProviderCatalogueCommand),
        }
    }
}

//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, gateway, estimator, storage, token verifier)
//! are implemented in `outbound`. Driving ports are implemented by the
//! domain services and called from `inbound::http`.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_command;
mod booking_query;
mod booking_repository;
mod distance_estimator;
mod notification_inbox;
mod notification_repository;
mod object_storage;
mod payment_command;
mod payment_gateway;
mod payment_repository;
mod provider_catalogue_command;
mod provider_service_repository;
mod service_commission_command;
mod service_commission_repository;
mod service_pricing_command;
mod service_pricing_repository;
mod token_verifier;
mod user_command;
mod user_repository;

#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{BookingCommand, CreateBookingRequest, FixtureBookingCommand};
#[cfg(test)]
pub use booking_query::{MockBookingQuery, MockProviderMatchingQuery};
pub use booking_query::{BookingQuery, FixtureBookingQuery, ProviderMatch, ProviderMatchingQuery};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{
    BookingFilter, BookingRepository, BookingRepositoryError, BookingTransition,
    FixtureBookingRepository,
};
#[cfg(test)]
pub use distance_estimator::MockDistanceEstimator;
pub use distance_estimator::{
    DistanceEstimator, DistanceEstimatorError, FixtureDistanceEstimator, TravelEstimate,
};
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::{FixtureNotificationInbox, NotificationInbox};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationFilter, NotificationRepository,
    NotificationRepositoryError,
};
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{FixtureObjectStorage, ObjectStorage, ObjectStorageError};
#[cfg(test)]
pub use payment_command::MockPaymentCommand;
pub use payment_command::{
    FixturePaymentCommand, InitializeOutcome, InitializePaymentResponse, PaymentCommand,
    RegisterPayoutRequest, WalletView,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    FIXTURE_ACCESS_CODE, FixturePaymentGateway, InitializeTransaction, NewRecipient,
    PaymentGateway, PaymentGatewayError, TransactionInit,
};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{
    FixturePaymentRepository, PaymentRepository, PaymentRepositoryError, Settlement,
    WalletCredit,
};
#[cfg(test)]
pub use provider_catalogue_command::MockProviderCatalogueCommand;
pub use provider_catalogue_command::{
    FixtureProviderCatalogueCommand, ImageUpload, ProviderCatalogueCommand,
};
#[cfg(test)]
pub use provider_service_repository::MockProviderServiceRepository;
pub use provider_service_repository::{
    FixtureProviderServiceRepository, MatchCriteria, ProviderServiceRepository,
    ProviderServiceRepositoryError,
};
#[cfg(test)]
pub use service_commission_command::MockServiceCommissionCommand;
pub use service_commission_command::{FixtureServiceCommissionCommand, ServiceCommissionCommand};
#[cfg(test)]
pub use service_commission_repository::MockServiceCommissionRepository;
pub use service_commission_repository::{
    FIXTURE_COMMISSION_PERCENTAGE, FixtureServiceCommissionRepository,
    ServiceCommissionRepository, ServiceCommissionRepositoryError,
};
#[cfg(test)]
pub use service_pricing_command::MockServicePricingCommand;
pub use service_pricing_command::{FixtureServicePricingCommand, ServicePricingCommand};
#[cfg(test)]
pub use service_pricing_repository::MockServicePricingRepository;
pub use service_pricing_repository::{
    FIXTURE_RATE_PER_HOUR, FixtureServicePricingRepository, ServicePricingRepository,
    ServicePricingRepositoryError,
};
#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use token_verifier::{
    FIXTURE_TOKEN, FIXTURE_USER_ID, FixtureTokenVerifier, TokenVerifier, TokenVerifierError,
};
#[cfg(test)]
pub use user_command::{MockUserCommand, MockUserQuery};
pub use user_command::{FixtureUserCommand, UserCommand, UserQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};

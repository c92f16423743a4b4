//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the marketplace entities (bookings, invitations,
//! payments, wallets, provider offerings) and the services that coordinate
//! them through the ports in [`ports`]. Types here never depend on actix or
//! diesel; adapters translate at the edges.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Booking and its status graph, Invitation, Notification.
//! - Payment, Wallet and the ledger arithmetic.
//! - UserProfile and the platform ServiceCommission.
//! - Service implementations of the driving ports.

pub mod booking;
mod booking_service;
pub mod commission;
mod commission_service;
pub mod error;
pub mod invitation;
mod matching_service;
pub mod notification;
mod notification_service;
pub mod payment;
mod payment_service;
pub mod ports;
pub mod pricing;
mod pricing_service;
mod provider_catalogue_service;
pub mod provider_service;
pub mod service_type;
#[cfg(test)]
pub(crate) mod service_test_support;
pub mod trace_id;
pub mod user;
pub mod user_profile;
mod user_service;

pub use self::booking::{
    Address, Booking, BookingDraft, BookingSchedule, BookingStatus, BookingType,
    BookingValidationError, Locality, MIN_ADDRESS_COMPONENTS,
};
pub use self::booking_service::BookingService;
pub use self::commission::{COMMISSION_PERCENTAGE_RANGE, ServiceCommission};
pub use self::commission_service::ServiceCommissionService;
pub use self::error::{Error, ErrorCode};
pub use self::invitation::{Invitation, InvitationStatus, UnknownInvitationStatus};
pub use self::matching_service::{ProviderMatchingService, UNKNOWN_ESTIMATE};
pub use self::notification::{
    NewNotification, Notification, NotificationKind, UnknownNotificationKind, messages,
};
pub use self::notification_service::NotificationService;
pub use self::payment::{
    CURRENCY, GatewayOutcome, LedgerDelta, Payment, PaymentStatus, PaymentType,
    PaymentValidationError, PayoutRecipient, Wallet, WalletError, amount_in_kobo,
};
pub use self::payment_service::PaymentService;
pub use self::pricing::{
    MAX_BOOKING_DAYS, MAX_BOOKING_HOURS_PER_DAY, PricingError, ServicePricing, resolve_price,
};
pub use self::pricing_service::{PricingResolver, ServicePricingService};
pub use self::provider_catalogue_service::{MAX_CONCURRENT_UPLOADS, ProviderCatalogueService};
pub use self::provider_service::{
    Availability, ImageContentType, ProviderService, ProviderServiceDetails,
    ProviderServiceValidationError, ServiceImage, TimeRange, image_storage_key,
};
pub use self::service_type::{ServiceType, UnknownServiceType};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Capability, Role, ServiceRole, User, UserId, UserValidationError, authorize,
};
pub use self::user_profile::{
    MAX_BIO_LENGTH, MAX_NAME_LENGTH, PhoneNumber, ProfileEdit, ProfileUpdate,
    ProfileValidationError, UserFilter, UserProfile,
};
pub(crate) use self::user_service::map_user_repository_error;
pub use self::user_service::UserService;

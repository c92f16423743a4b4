//! PostgreSQL persistence adapters using Diesel with `diesel-async`.
//!
//! Row structs and the schema stay private to this module. Every repository
//! checks connections out of the shared [`DbPool`] and bounds each operation
//! by the pool's time budget.
//!
//! ```ignore
//! use marketplace::outbound::persistence::{DbPool, DieselBookingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/marketplace")).await?;
//! let bookings = DieselBookingRepository::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_booking_repository;
mod diesel_notification_repository;
mod diesel_payment_repository;
mod diesel_provider_service_repository;
mod diesel_service_commission_repository;
mod diesel_service_pricing_repository;
mod diesel_token_store;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_provider_service_repository::DieselProviderServiceRepository;
pub use diesel_service_commission_repository::DieselServiceCommissionRepository;
pub use diesel_service_pricing_repository::DieselServicePricingRepository;
pub use diesel_token_store::{DieselTokenStore, token_digest};
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DEFAULT_OPERATION_TIMEOUT, DbPool, PoolConfig, PoolError};

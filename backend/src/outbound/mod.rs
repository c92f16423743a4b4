//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel and `diesel-async`
//! - **paystack**: the payment gateway over reqwest
//! - **distance_matrix**: Google Distance Matrix travel estimates
//! - **local_storage**: filesystem image storage under a capability root
//!
//! Adapters translate between domain types and wire or row formats. They
//! carry no business rules.

pub mod distance_matrix;
mod http_support;
pub mod local_storage;
pub mod paystack;
pub mod persistence;
pub mod retry;

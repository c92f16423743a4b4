//! Driving port for booking lifecycle mutations.
//!
//! Create takes raw field text so the service can apply its checks in a
//! fixed order: role before address, address before types, types before
//! dates.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus, Error, Invitation, User, UserId};

/// Unparsed booking fields as submitted by a requester.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateBookingRequest {
    pub address: String,
    pub service_type: String,
    pub booking_type: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    pub end_date: String,
    /// `HH:MM:SS`, optionally followed by an offset such as `Z` or `+01:00`.
    pub start_time: String,
    pub end_time: String,
}

/// Driving port for booking writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Price and persist a new open booking owned by `actor`.
    async fn create_booking(
        &self,
        actor: &User,
        request: CreateBookingRequest,
    ) -> Result<Booking, Error>;

    /// Complete or cancel a booking on behalf of its requester.
    async fn update_status(
        &self,
        actor: &User,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error>;

    /// Invite a provider to an open booking.
    async fn select_provider(
        &self,
        actor: &User,
        booking_id: Uuid,
        provider_id: &UserId,
    ) -> Result<Invitation, Error>;

    /// Accept an invitation, assigning the actor to the booking.
    async fn accept(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error>;

    /// Decline an invitation. The booking stays open for other providers.
    async fn reject(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error>;
}

/// Fixture command for wiring without persistence; every booking is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingCommand;

fn missing(booking_id: Uuid) -> Error {
    Error::not_found(format!("booking {booking_id} not found"))
}

#[async_trait]
impl BookingCommand for FixtureBookingCommand {
    async fn create_booking(
        &self,
        _actor: &User,
        _request: CreateBookingRequest,
    ) -> Result<Booking, Error> {
        Err(Error::service_unavailable("booking store is not configured"))
    }

    async fn update_status(
        &self,
        _actor: &User,
        booking_id: Uuid,
        _status: BookingStatus,
    ) -> Result<Booking, Error> {
        Err(missing(booking_id))
    }

    async fn select_provider(
        &self,
        _actor: &User,
        booking_id: Uuid,
        _provider_id: &UserId,
    ) -> Result<Invitation, Error> {
        Err(missing(booking_id))
    }

    async fn accept(&self, _actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        Err(missing(booking_id))
    }

    async fn reject(&self, _actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        Err(missing(booking_id))
    }
}

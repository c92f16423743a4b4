//! Driving port for booking reads and provider matching.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Booking, Error, ProviderService, User};

use super::BookingFilter;

/// One candidate provider with the estimated trip to the booking address.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMatch {
    pub service: ProviderService,
    /// Human-readable distance, or `"unknown"`.
    pub distance: String,
    /// Human-readable duration, or `"unknown"`.
    pub duration: String,
}

/// Driving port for booking reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// One booking visible to `actor`.
    async fn get_booking(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error>;

    /// Bookings matching `filter`. Non-admin actors only see bookings they
    /// take part in.
    async fn list_bookings(
        &self,
        actor: &User,
        filter: BookingFilter,
        page: PageRequest,
    ) -> Result<Page<Booking>, Error>;
}

/// Driving port for the provider search behind an open booking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderMatchingQuery: Send + Sync {
    /// Providers near the booking address offering its service type.
    async fn find_providers(
        &self,
        actor: &User,
        booking_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ProviderMatch>, Error>;
}

/// Fixture query with no stored bookings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingQuery;

#[async_trait]
impl BookingQuery for FixtureBookingQuery {
    async fn get_booking(&self, _actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        Err(Error::not_found(format!("booking {booking_id} not found")))
    }

    async fn list_bookings(
        &self,
        _actor: &User,
        _filter: BookingFilter,
        page: PageRequest,
    ) -> Result<Page<Booking>, Error> {
        Ok(Page::new(Vec::new(), page))
    }
}

#[async_trait]
impl ProviderMatchingQuery for FixtureBookingQuery {
    async fn find_providers(
        &self,
        _actor: &User,
        booking_id: Uuid,
        _page: PageRequest,
    ) -> Result<Page<ProviderMatch>, Error> {
        Err(Error::not_found(format!("booking {booking_id} not found")))
    }
}

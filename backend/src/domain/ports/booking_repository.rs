//! Port for booking persistence, invitation and rejection reads, and the
//! transactional lifecycle writes.
//!
//! Every status change is written together with its invitation and
//! notification rows as one [`BookingTransition`]. Adapters must apply a
//! transition atomically and report [`BookingRepositoryError::StaleState`]
//! when the booking no longer holds the status the transition expects.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, BookingType, Invitation, NewNotification, ServiceType, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "booking repository query failed: {message}",
        /// A conditional update matched no row.
        StaleState => "booking changed concurrently: {message}",
    }
}

/// Narrowing filters for booking lists. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Restrict to bookings where this user is requester or provider.
    pub participant: Option<UserId>,
    pub requester_id: Option<UserId>,
    pub provider_id: Option<UserId>,
    pub service_type: Option<ServiceType>,
    pub booking_type: Option<BookingType>,
    pub status: Option<BookingStatus>,
    /// Earliest start date, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Latest end date, inclusive.
    pub end_date: Option<NaiveDate>,
}

/// A lifecycle write and the rows that must land with it.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingTransition {
    /// Record a pending invitation and tell the provider. Re-inviting the
    /// same provider is a no-op.
    Invite {
        invitation: Invitation,
        notification: NewNotification,
    },
    /// Assign the provider if the booking is still open, mark the invitation
    /// accepted, and tell the requester.
    Accept {
        booking_id: Uuid,
        provider_id: UserId,
        notification: NewNotification,
    },
    /// Append a rejection, mark the invitation rejected, and tell the
    /// requester. The booking row is untouched.
    Reject {
        booking_id: Uuid,
        provider_id: UserId,
        notification: NewNotification,
    },
    /// Move an in-progress booking to completed.
    Complete {
        booking_id: Uuid,
        notification: Option<NewNotification>,
    },
    /// Cancel a booking currently in `from`.
    Cancel {
        booking_id: Uuid,
        from: BookingStatus,
        notification: Option<NewNotification>,
    },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a new booking.
    async fn create(&self, booking: &Booking) -> Result<(), BookingRepositoryError>;

    /// Fetch a booking by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Page through bookings matching `filter`, newest first.
    async fn list(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// The invitation of `invitee` to `booking_id`, if any.
    async fn find_invitation(
        &self,
        booking_id: Uuid,
        invitee: &UserId,
    ) -> Result<Option<Invitation>, BookingRepositoryError>;

    /// Whether `provider` has ever rejected `booking_id`.
    async fn has_rejected(
        &self,
        booking_id: Uuid,
        provider: &UserId,
    ) -> Result<bool, BookingRepositoryError>;

    /// Apply a lifecycle write atomically.
    async fn apply_transition(
        &self,
        transition: &BookingTransition,
        at: DateTime<Utc>,
    ) -> Result<(), BookingRepositoryError>;
}

/// Fixture repository with no stored bookings that accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingRepository;

#[async_trait]
impl BookingRepository for FixtureBookingRepository {
    async fn create(&self, _booking: &Booking) -> Result<(), BookingRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &BookingFilter,
        _page: PageRequest,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_invitation(
        &self,
        _booking_id: Uuid,
        _invitee: &UserId,
    ) -> Result<Option<Invitation>, BookingRepositoryError> {
        Ok(None)
    }

    async fn has_rejected(
        &self,
        _booking_id: Uuid,
        _provider: &UserId,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(false)
    }

    async fn apply_transition(
        &self,
        _transition: &BookingTransition,
        _at: DateTime<Utc>,
    ) -> Result<(), BookingRepositoryError> {
        Ok(())
    }
}

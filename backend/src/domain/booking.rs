//! Booking aggregate: status graph, schedule, and address parsing.
//!
//! A booking is created `open` without a provider. Accepting assigns the
//! provider and moves it to `in_progress`; the requester then completes or
//! cancels it. Rejections are recorded per provider and never touch the
//! booking status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ServiceType, UserId};

/// Minimum number of comma separated components in a postal address.
pub const MIN_ADDRESS_COMPONENTS: usize = 4;

/// Validation errors raised while building bookings and their parts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    #[error("address must contain street, city, state and country separated by commas")]
    AddressTooShort,
    #[error("unknown booking status: {0}")]
    UnknownStatus(String),
    #[error("unknown booking type: {0}")]
    UnknownType(String),
    #[error("an open booking must not have a provider")]
    ProviderOnOpenBooking,
    #[error("a {0} booking must have a provider")]
    MissingProvider(BookingStatus),
    #[error("{field} must be a finite, non-negative amount")]
    InvalidAmount { field: &'static str },
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Open,
    InProgress,
    Completed,
    Canceled,
}

impl BookingStatus {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// Whether `next` is reachable in a single step.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::BookingStatus;
    ///
    /// assert!(BookingStatus::Open.can_transition_to(BookingStatus::InProgress));
    /// assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Canceled));
    /// ```
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::InProgress)
                | (Self::Open, Self::Canceled)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Canceled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            other => Err(BookingValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Same-day or multi-day engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Instant,
    Scheduled,
}

impl BookingType {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingType {
    type Err = BookingValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "instant" => Ok(Self::Instant),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(BookingValidationError::UnknownType(other.to_owned())),
        }
    }
}

/// Free-text postal address with at least street, city, state and country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Validate the component count and wrap the raw address.
    pub fn new(raw: impl Into<String>) -> Result<Self, BookingValidationError> {
        let raw = raw.into();
        if raw.split(',').count() < MIN_ADDRESS_COMPONENTS {
            return Err(BookingValidationError::AddressTooShort);
        }
        Ok(Self(raw))
    }

    /// Raw address text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// City, state and country taken from the end of the address.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::Address;
    ///
    /// let address = Address::new("12 Allen Avenue, Ikeja, Lagos, Nigeria").expect("valid address");
    /// assert_eq!(address.locality().suffix(), "Ikeja, Lagos, Nigeria");
    /// ```
    pub fn locality(&self) -> Locality {
        let mut parts = self.0.rsplit(',').map(str::trim);
        // The constructor guarantees at least four components.
        let country = parts.next().unwrap_or_default().to_owned();
        let state = parts.next().unwrap_or_default().to_owned();
        let city = parts.next().unwrap_or_default().to_owned();
        Locality {
            city,
            state,
            country,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = BookingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Trailing city, state and country of an address, used for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Locality {
    /// The `"{city}, {state}, {country}"` suffix candidate addresses must end with.
    pub fn suffix(&self) -> String {
        format!("{}, {}, {}", self.city, self.state, self.country)
    }
}

/// Start and end of a booking.
///
/// `start_time` combines the start date with the start time of day and
/// `end_time` combines the end date with the end time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSchedule {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl BookingSchedule {
    /// Whole days between the start and end dates. Negative when reversed.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Fractional hours between the start and end timestamps.
    pub fn span_hours(&self) -> f64 {
        seconds_to_hours((self.end_time - self.start_time).num_seconds())
    }

    /// Fractional hours between the start and end times of day.
    pub fn daily_hours(&self) -> f64 {
        let start = f64::from(self.start_time.num_seconds_from_midnight());
        let end = f64::from(self.end_time.num_seconds_from_midnight());
        (end - start) / 3600.0
    }

    /// Whether `now` has reached the end hour, comparing UTC hours only.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now.hour() >= self.end_time.hour()
    }
}

fn seconds_to_hours(seconds: i64) -> f64 {
    seconds as f64 / 3600.0
}

/// Unvalidated booking fields used to construct [`Booking`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub id: Uuid,
    pub requester_id: UserId,
    pub provider_id: Option<UserId>,
    pub address: Address,
    pub service_type: ServiceType,
    pub booking_type: BookingType,
    pub description: String,
    pub schedule: BookingSchedule,
    pub total_price: f64,
    pub actual_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A service request posted by a requester.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    id: Uuid,
    requester_id: UserId,
    provider_id: Option<UserId>,
    address: Address,
    service_type: ServiceType,
    booking_type: BookingType,
    description: String,
    schedule: BookingSchedule,
    total_price: f64,
    actual_price: f64,
    status: BookingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Booking {
    /// Validate the provider/status pairing and monetary fields.
    pub fn new(draft: BookingDraft) -> Result<Self, BookingValidationError> {
        match (draft.status, &draft.provider_id) {
            (BookingStatus::Open, Some(_)) => {
                return Err(BookingValidationError::ProviderOnOpenBooking);
            }
            (status @ (BookingStatus::InProgress | BookingStatus::Completed), None) => {
                return Err(BookingValidationError::MissingProvider(status));
            }
            _ => {}
        }
        ensure_amount(draft.total_price, "totalPrice")?;
        ensure_amount(draft.actual_price, "actualPrice")?;

        Ok(Self {
            id: draft.id,
            requester_id: draft.requester_id,
            provider_id: draft.provider_id,
            address: draft.address,
            service_type: draft.service_type,
            booking_type: draft.booking_type,
            description: draft.description,
            schedule: draft.schedule,
            total_price: draft.total_price,
            actual_price: draft.actual_price,
            status: draft.status,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn requester_id(&self) -> &UserId {
        &self.requester_id
    }

    pub fn provider_id(&self) -> Option<&UserId> {
        self.provider_id.as_ref()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    pub fn booking_type(&self) -> BookingType {
        self.booking_type
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn schedule(&self) -> &BookingSchedule {
        &self.schedule
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn actual_price(&self) -> f64 {
        self.actual_price
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `user` posted this booking.
    pub fn is_requester(&self, user: &UserId) -> bool {
        &self.requester_id == user
    }

    /// Whether `user` is the assigned provider.
    pub fn is_provider(&self, user: &UserId) -> bool {
        self.provider_id.as_ref() == Some(user)
    }

    /// Copy of this booking with a new status and provider, as persisted by a
    /// successful transition.
    pub fn transitioned(
        &self,
        status: BookingStatus,
        provider_id: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<Self, BookingValidationError> {
        Self::new(BookingDraft {
            id: self.id,
            requester_id: self.requester_id.clone(),
            provider_id,
            address: self.address.clone(),
            service_type: self.service_type,
            booking_type: self.booking_type,
            description: self.description.clone(),
            schedule: self.schedule,
            total_price: self.total_price,
            actual_price: self.actual_price,
            status,
            created_at: self.created_at,
            updated_at: at,
        })
    }
}

fn ensure_amount(value: f64, field: &'static str) -> Result<(), BookingValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BookingValidationError::InvalidAmount { field })
    }
}

#[cfg(test)]
mod tests;

//! Service pricing and the booking price rules.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{BookingSchedule, BookingType, ServiceType};

/// Longest billable span per day, in hours.
pub const MAX_BOOKING_HOURS_PER_DAY: f64 = 10.0;
/// Longest scheduled booking, in days.
pub const MAX_BOOKING_DAYS: i64 = 30;

/// Reasons a schedule cannot be priced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("invalid start and end time: {hours} hours is outside 0..=10")]
    HoursOutOfRange { hours: f64 },
    #[error("invalid start and end days: {days} days is outside 0..=30")]
    DaysOutOfRange { days: i64 },
}

/// Hourly rate for one service type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePricing {
    pub id: Uuid,
    pub service_type: ServiceType,
    pub rate_per_hour: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Price a booking from its hourly rate and schedule.
///
/// Instant bookings bill the span between start and end. Scheduled bookings
/// bill the daily time-of-day span once per whole day between the dates.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use marketplace::domain::{BookingSchedule, BookingType, resolve_price};
///
/// let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
/// let schedule = BookingSchedule {
///     start_date: date,
///     end_date: date,
///     start_time: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).single().expect("valid"),
///     end_time: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).single().expect("valid"),
/// };
/// let price = resolve_price(5000.0, BookingType::Instant, &schedule).expect("in range");
/// assert_eq!(price, 10_000.0);
/// ```
pub fn resolve_price(
    rate_per_hour: f64,
    booking_type: BookingType,
    schedule: &BookingSchedule,
) -> Result<f64, PricingError> {
    match booking_type {
        BookingType::Instant => {
            let hours = ensure_hours(schedule.span_hours())?;
            Ok(rate_per_hour * hours)
        }
        BookingType::Scheduled => {
            let days = schedule.days();
            if !(0..=MAX_BOOKING_DAYS).contains(&days) {
                return Err(PricingError::DaysOutOfRange { days });
            }
            let hours = ensure_hours(schedule.daily_hours())?;
            Ok(rate_per_hour * hours * days as f64)
        }
    }
}

fn ensure_hours(hours: f64) -> Result<f64, PricingError> {
    if (0.0..=MAX_BOOKING_HOURS_PER_DAY).contains(&hours) {
        Ok(hours)
    } else {
        Err(PricingError::HoursOutOfRange { hours })
    }
}

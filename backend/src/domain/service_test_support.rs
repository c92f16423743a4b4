//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::{
    Address, Booking, BookingDraft, BookingSchedule, BookingStatus, BookingType, Role,
    ServiceRole, ServiceType, User, UserId,
};

pub(crate) const ADDRESS: &str = "12 Allen Avenue, Ikeja, Lagos, Nigeria";

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn clock_at(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    clock_at(fixture_timestamp())
}

pub(crate) fn user(role: Role, service_role: ServiceRole) -> User {
    let id = UserId::random();
    User {
        email: format!("{id}@example.com"),
        id,
        role,
        service_role,
    }
}

pub(crate) fn requester() -> User {
    user(Role::Regular, ServiceRole::Requester)
}

pub(crate) fn provider() -> User {
    user(Role::Regular, ServiceRole::Provider)
}

/// 10:00 to 12:00 UTC on the fixture day.
pub(crate) fn schedule() -> BookingSchedule {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
    let at = |hour| Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).expect("valid time"));
    BookingSchedule {
        start_date: date,
        end_date: date,
        start_time: at(10),
        end_time: at(12),
    }
}

pub(crate) fn booking(
    requester_id: &UserId,
    status: BookingStatus,
    provider_id: Option<&UserId>,
) -> Booking {
    let at = fixture_timestamp();
    Booking::new(BookingDraft {
        id: Uuid::new_v4(),
        requester_id: requester_id.clone(),
        provider_id: provider_id.cloned(),
        address: Address::new(ADDRESS).expect("valid address"),
        service_type: ServiceType::Cleaning,
        booking_type: BookingType::Instant,
        description: "two bedroom flat".to_owned(),
        schedule: schedule(),
        total_price: 10_000.0,
        actual_price: 0.0,
        status,
        created_at: at,
        updated_at: at,
    })
    .expect("valid booking")
}

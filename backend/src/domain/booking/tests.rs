//! Tests for the booking aggregate and its value types.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0).expect("valid time"))
}

fn day(value: &str) -> NaiveDate {
    value.parse().expect("valid date")
}

#[fixture]
fn schedule() -> BookingSchedule {
    let date = day("2026-03-02");
    BookingSchedule {
        start_date: date,
        end_date: date,
        start_time: at(date, 10, 0),
        end_time: at(date, 12, 30),
    }
}

#[fixture]
fn draft(schedule: BookingSchedule) -> BookingDraft {
    let now = at(day("2026-03-01"), 9, 0);
    BookingDraft {
        id: Uuid::new_v4(),
        requester_id: UserId::random(),
        provider_id: None,
        address: Address::new("1 Marina Road, Ikeja, Lagos, Nigeria").expect("valid address"),
        service_type: ServiceType::Cleaning,
        booking_type: BookingType::Instant,
        description: "deep clean".to_owned(),
        schedule,
        total_price: 12_500.0,
        actual_price: 0.0,
        status: BookingStatus::Open,
        created_at: now,
        updated_at: now,
    }
}

#[rstest]
#[case(BookingStatus::Open, BookingStatus::InProgress, true)]
#[case(BookingStatus::Open, BookingStatus::Canceled, true)]
#[case(BookingStatus::Open, BookingStatus::Completed, false)]
#[case(BookingStatus::InProgress, BookingStatus::Completed, true)]
#[case(BookingStatus::InProgress, BookingStatus::Canceled, true)]
#[case(BookingStatus::InProgress, BookingStatus::Open, false)]
#[case(BookingStatus::Completed, BookingStatus::Canceled, false)]
#[case(BookingStatus::Canceled, BookingStatus::Open, false)]
fn status_graph(#[case] from: BookingStatus, #[case] to: BookingStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
#[case("open", BookingStatus::Open)]
#[case("in_progress", BookingStatus::InProgress)]
#[case("completed", BookingStatus::Completed)]
#[case("canceled", BookingStatus::Canceled)]
fn status_round_trips(#[case] raw: &str, #[case] status: BookingStatus) {
    assert_eq!(raw.parse::<BookingStatus>(), Ok(status));
    assert_eq!(status.to_string(), raw);
}

#[rstest]
fn unknown_booking_type_is_rejected() {
    assert_eq!(
        "recurring".parse::<BookingType>(),
        Err(BookingValidationError::UnknownType("recurring".to_owned()))
    );
}

#[rstest]
#[case("Ikeja, Lagos, Nigeria")]
#[case("Nigeria")]
#[case("")]
fn address_requires_four_components(#[case] raw: &str) {
    assert_eq!(Address::new(raw), Err(BookingValidationError::AddressTooShort));
}

#[rstest]
fn locality_reads_trailing_components_trimmed() {
    let address = Address::new("Flat 2, 7 Bode Thomas St ,Surulere , Lagos,Nigeria ")
        .expect("valid address");
    let locality = address.locality();
    assert_eq!(locality.city, "Surulere");
    assert_eq!(locality.state, "Lagos");
    assert_eq!(locality.country, "Nigeria");
    assert_eq!(locality.suffix(), "Surulere, Lagos, Nigeria");
}

#[rstest]
fn schedule_measures_hours_and_days(schedule: BookingSchedule) {
    assert_eq!(schedule.days(), 0);
    assert!((schedule.span_hours() - 2.5).abs() < f64::EPSILON);
    assert!((schedule.daily_hours() - 2.5).abs() < f64::EPSILON);
}

#[rstest]
fn multi_day_schedule_uses_time_of_day_for_daily_hours() {
    let start = day("2026-03-02");
    let end = day("2026-03-05");
    let schedule = BookingSchedule {
        start_date: start,
        end_date: end,
        start_time: at(start, 9, 0),
        end_time: at(end, 13, 0),
    };
    assert_eq!(schedule.days(), 3);
    assert!((schedule.daily_hours() - 4.0).abs() < f64::EPSILON);
    assert!(schedule.span_hours() > 24.0);
}

#[rstest]
#[case(11, false)]
#[case(12, true)]
#[case(18, true)]
fn due_compares_utc_hours(schedule: BookingSchedule, #[case] hour: u32, #[case] due: bool) {
    let now = at(day("2026-03-02"), hour, 0);
    assert_eq!(schedule.is_due(now), due);
}

#[rstest]
fn open_booking_with_provider_is_rejected(mut draft: BookingDraft) {
    draft.provider_id = Some(UserId::random());
    assert_eq!(
        Booking::new(draft),
        Err(BookingValidationError::ProviderOnOpenBooking)
    );
}

#[rstest]
#[case(BookingStatus::InProgress)]
#[case(BookingStatus::Completed)]
fn assigned_states_require_provider(mut draft: BookingDraft, #[case] status: BookingStatus) {
    draft.status = status;
    assert_eq!(
        Booking::new(draft),
        Err(BookingValidationError::MissingProvider(status))
    );
}

#[rstest]
fn canceled_booking_may_lack_provider(mut draft: BookingDraft) {
    draft.status = BookingStatus::Canceled;
    assert!(Booking::new(draft).is_ok());
}

#[rstest]
fn negative_price_is_rejected(mut draft: BookingDraft) {
    draft.total_price = -1.0;
    assert_eq!(
        Booking::new(draft),
        Err(BookingValidationError::InvalidAmount {
            field: "totalPrice"
        })
    );
}

#[rstest]
fn transitioned_assigns_provider_and_keeps_price(draft: BookingDraft) {
    let booking = Booking::new(draft).expect("valid booking");
    let provider = UserId::random();
    let later = booking.created_at() + chrono::Duration::hours(1);

    let assigned = booking
        .transitioned(BookingStatus::InProgress, Some(provider.clone()), later)
        .expect("valid transition");

    assert_eq!(assigned.status(), BookingStatus::InProgress);
    assert!(assigned.is_provider(&provider));
    assert!(assigned.is_requester(booking.requester_id()));
    assert_eq!(assigned.total_price(), booking.total_price());
    assert_eq!(assigned.updated_at(), later);
}

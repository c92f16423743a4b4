//! Diesel row structs and their conversions into domain values.
//!
//! Rows never leave the persistence layer. Conversions report malformed
//! columns as plain strings; repositories wrap them in their `Query` error.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Address, Availability, Booking, BookingDraft, BookingSchedule, Invitation, NewNotification,
    Notification, Payment, PayoutRecipient, ProfileUpdate, ProviderService,
    ProviderServiceDetails, ServiceCommission, ServiceImage, ServicePricing, User, UserId,
    UserProfile, Wallet,
};

use super::schema::{
    api_tokens, booking_invitations, bookings, notifications, payment_access_codes, payments,
    payout_recipients, provider_services, rejected_bookings, service_commissions, service_images,
    service_pricings, user_wallets, users,
};

fn parse_column<T>(column: &str, raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|err| format!("invalid {column} column: {err}"))
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub service_role: String,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            role: parse_column("role", &self.role)?,
            service_role: parse_column("service_role", &self.service_role)?,
            email: self.email,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub role: &'a str,
    pub service_role: &'a str,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: &user.email,
            role: user.role.as_str(),
            service_role: user.service_role.as_str(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserProfileRow {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub service_role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfileRow {
    pub(crate) fn into_domain(self) -> Result<UserProfile, String> {
        Ok(UserProfile {
            id: UserId::from_uuid(self.id),
            email: Some(self.email),
            role: parse_column("role", &self.role)?,
            service_role: parse_column("service_role", &self.service_role)?,
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            bio: self.bio,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Profile columns to overwrite. `None` fields are left out of the `SET`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ProfileChangeset<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub address: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ProfileChangeset<'a> {
    pub(crate) fn new(update: &'a ProfileUpdate, at: DateTime<Utc>) -> Self {
        Self {
            first_name: update.first_name.as_deref(),
            last_name: update.last_name.as_deref(),
            phone_number: update.phone_number.as_ref().map(|phone| phone.as_str()),
            bio: update.bio.as_deref(),
            address: update.address.as_ref().map(Address::as_str),
            updated_at: at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = api_tokens)]
pub(crate) struct NewApiTokenRow<'a> {
    pub token_digest: &'a str,
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Bookings, invitations, rejections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub address: String,
    pub service_type: String,
    pub booking_type: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: f64,
    pub actual_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingRow {
    fn from(booking: &Booking) -> Self {
        let schedule = booking.schedule();
        Self {
            id: booking.id(),
            requester_id: *booking.requester_id().as_uuid(),
            provider_id: booking.provider_id().map(|id| *id.as_uuid()),
            address: booking.address().as_str().to_owned(),
            service_type: booking.service_type().as_str().to_owned(),
            booking_type: booking.booking_type().as_str().to_owned(),
            description: booking.description().to_owned(),
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            total_price: booking.total_price(),
            actual_price: booking.actual_price(),
            status: booking.status().as_str().to_owned(),
            created_at: booking.created_at(),
            updated_at: booking.updated_at(),
        }
    }
}

impl BookingRow {
    pub(crate) fn into_domain(self) -> Result<Booking, String> {
        let address =
            Address::new(self.address).map_err(|err| format!("invalid address column: {err}"))?;
        Booking::new(BookingDraft {
            id: self.id,
            requester_id: UserId::from_uuid(self.requester_id),
            provider_id: self.provider_id.map(UserId::from_uuid),
            address,
            service_type: parse_column("service_type", &self.service_type)?,
            booking_type: parse_column("booking_type", &self.booking_type)?,
            description: self.description,
            schedule: BookingSchedule {
                start_date: self.start_date,
                end_date: self.end_date,
                start_time: self.start_time,
                end_time: self.end_time,
            },
            total_price: self.total_price,
            actual_price: self.actual_price,
            status: parse_column("status", &self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
        .map_err(|err| format!("booking {} violates invariants: {err}", self.id))
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = booking_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvitationRow {
    pub booking_id: Uuid,
    pub invitee_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Invitation> for InvitationRow {
    fn from(invitation: &Invitation) -> Self {
        Self {
            booking_id: invitation.booking_id,
            invitee_id: *invitation.invitee_id.as_uuid(),
            status: invitation.status.as_str().to_owned(),
            created_at: invitation.created_at,
            updated_at: invitation.updated_at,
        }
    }
}

impl InvitationRow {
    pub(crate) fn into_domain(self) -> Result<Invitation, String> {
        Ok(Invitation {
            booking_id: self.booking_id,
            invitee_id: UserId::from_uuid(self.invitee_id),
            status: parse_column("status", &self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rejected_bookings)]
pub(crate) struct NewRejectionRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub kind: String,
    pub user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationRow {
    pub(crate) fn into_domain(self) -> Result<Notification, String> {
        Ok(Notification {
            id: self.id,
            kind: parse_column("kind", &self.kind)?,
            user_id: UserId::from_uuid(self.user_id),
            booking_id: self.booking_id,
            message: self.message,
            seen: self.seen,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub kind: &'a str,
    pub user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewNotificationRow<'a> {
    pub(crate) fn new(notification: &'a NewNotification, at: DateTime<Utc>) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind.as_str(),
            user_id: *notification.user_id.as_uuid(),
            booking_id: notification.booking_id,
            message: &notification.message,
            created_at: at,
        }
    }
}

// ---------------------------------------------------------------------------
// Payments, access codes, wallets, recipients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub payment_type: String,
    pub booking_id: Option<Uuid>,
    pub amount: f64,
    pub reference: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            payment_type: payment.payment_type.as_str().to_owned(),
            booking_id: payment.booking_id,
            amount: payment.amount,
            reference: payment.reference.clone(),
            status: payment.status.as_str().to_owned(),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

impl PaymentRow {
    pub(crate) fn into_domain(self) -> Result<Payment, String> {
        Ok(Payment {
            id: self.id,
            payment_type: parse_column("payment_type", &self.payment_type)?,
            booking_id: self.booking_id,
            amount: self.amount,
            reference: self.reference,
            status: parse_column("status", &self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_access_codes)]
pub(crate) struct NewAccessCodeRow<'a> {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub access_code: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_wallets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletRow {
    pub user_id: Uuid,
    pub credits: f64,
    pub debits: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WalletRow> for Wallet {
    fn from(row: WalletRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            credits: row.credits,
            debits: row.debits,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_wallets)]
pub(crate) struct NewWalletRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credits: f64,
    pub debits: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payout_recipients)]
pub(crate) struct PayoutRecipientRow<'a> {
    pub user_id: Uuid,
    pub recipient_code: &'a str,
    pub account_name: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a PayoutRecipient> for PayoutRecipientRow<'a> {
    fn from(recipient: &'a PayoutRecipient) -> Self {
        Self {
            user_id: *recipient.user_id.as_uuid(),
            recipient_code: &recipient.recipient_code,
            account_name: &recipient.account_name,
            created_at: recipient.created_at,
            updated_at: recipient.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Pricing and provider offerings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = service_pricings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServicePricingRow {
    pub id: Uuid,
    pub service_type: String,
    pub rate_per_hour: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ServicePricing> for ServicePricingRow {
    fn from(pricing: &ServicePricing) -> Self {
        Self {
            id: pricing.id,
            service_type: pricing.service_type.as_str().to_owned(),
            rate_per_hour: pricing.rate_per_hour,
            created_at: pricing.created_at,
            updated_at: pricing.updated_at,
        }
    }
}

impl ServicePricingRow {
    pub(crate) fn into_domain(self) -> Result<ServicePricing, String> {
        Ok(ServicePricing {
            id: self.id,
            service_type: parse_column("service_type", &self.service_type)?,
            rate_per_hour: self.rate_per_hour,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// The `singleton` column is left to its default.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = service_commissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceCommissionRow {
    pub id: Uuid,
    pub percentage: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ServiceCommission> for ServiceCommissionRow {
    fn from(commission: &ServiceCommission) -> Self {
        Self {
            id: commission.id,
            percentage: commission.percentage,
            created_at: commission.created_at,
            updated_at: commission.updated_at,
        }
    }
}

impl From<ServiceCommissionRow> for ServiceCommission {
    fn from(row: ServiceCommissionRow) -> Self {
        Self {
            id: row.id,
            percentage: row.percentage,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = provider_services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProviderServiceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub description: String,
    pub rate_per_hour: f64,
    pub experience_years: i32,
    pub availability: serde_json::Value,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderServiceRow {
    pub(crate) fn from_domain(service: &ProviderService) -> Result<Self, String> {
        let availability = serde_json::to_value(&service.details.availability)
            .map_err(|err| format!("serialise availability: {err}"))?;
        Ok(Self {
            id: service.id,
            user_id: *service.user_id.as_uuid(),
            service_type: service.service_type.as_str().to_owned(),
            description: service.details.description.clone(),
            rate_per_hour: service.details.rate_per_hour,
            experience_years: service.details.experience_years,
            availability,
            address: service.details.address.as_str().to_owned(),
            created_at: service.created_at,
            updated_at: service.updated_at,
        })
    }

    pub(crate) fn into_domain(self) -> Result<ProviderService, String> {
        let availability: Availability = serde_json::from_value(self.availability)
            .map_err(|err| format!("invalid availability column: {err}"))?;
        let address =
            Address::new(self.address).map_err(|err| format!("invalid address column: {err}"))?;
        Ok(ProviderService {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            service_type: parse_column("service_type", &self.service_type)?,
            details: ProviderServiceDetails {
                description: self.description,
                rate_per_hour: self.rate_per_hour,
                experience_years: self.experience_years,
                availability,
                address,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = service_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceImageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ServiceImage> for ServiceImageRow {
    fn from(image: &ServiceImage) -> Self {
        Self {
            id: image.id,
            user_id: *image.user_id.as_uuid(),
            service_type: image.service_type.as_str().to_owned(),
            url: image.url.clone(),
            created_at: image.created_at,
        }
    }
}

impl ServiceImageRow {
    pub(crate) fn into_domain(self) -> Result<ServiceImage, String> {
        Ok(ServiceImage {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            service_type: parse_column("service_type", &self.service_type)?,
            url: self.url,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::{BookingStatus, Role, ServiceRole, ServiceType};

    fn booking_row(status: &str, provider_id: Option<Uuid>) -> BookingRow {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid timestamp");
        let day = at.date_naive();
        BookingRow {
            id: Uuid::new_v4(),
            requester_id: Uuid::new_v4(),
            provider_id,
            address: "12 Allen Avenue, Ikeja, Lagos, Nigeria".to_owned(),
            service_type: "cleaning".to_owned(),
            booking_type: "instant".to_owned(),
            description: "kitchen".to_owned(),
            start_date: day,
            end_date: day,
            start_time: at,
            end_time: at,
            total_price: 10_000.0,
            actual_price: 0.0,
            status: status.to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn booking_rows_round_trip_through_domain() {
        let row = booking_row("in_progress", Some(Uuid::new_v4()));
        let booking = row.clone().into_domain().expect("valid row");

        assert_eq!(booking.status(), BookingStatus::InProgress);
        assert_eq!(booking.service_type(), ServiceType::Cleaning);
        assert_eq!(BookingRow::from(&booking).provider_id, row.provider_id);
    }

    #[rstest]
    #[case::unknown_status("paused", None)]
    #[case::open_with_provider("open", Some(Uuid::new_v4()))]
    fn malformed_booking_rows_are_reported(#[case] status: &str, #[case] provider: Option<Uuid>) {
        assert!(booking_row(status, provider).into_domain().is_err());
    }

    #[rstest]
    fn user_rows_parse_closed_roles() {
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            role: "admin_super".to_owned(),
            service_role: "service_provider".to_owned(),
        };
        let user = row.into_domain().expect("valid row");
        assert_eq!(user.role, Role::SuperAdmin);
        assert_eq!(user.service_role, ServiceRole::Provider);
    }

    #[rstest]
    fn profile_rows_keep_optional_fields() {
        let at = Utc::now();
        let row = UserProfileRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            role: "regular".to_owned(),
            service_role: "service_both".to_owned(),
            first_name: Some("Ada".to_owned()),
            last_name: None,
            phone_number: Some("08031234567".to_owned()),
            bio: None,
            address: None,
            created_at: at,
            updated_at: at,
        };
        let profile = row.into_domain().expect("valid row");
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(profile.first_name.as_deref(), Some("Ada"));
        assert_eq!(profile.last_name, None);
        assert_eq!(profile.service_role, ServiceRole::Both);
    }

    #[rstest]
    fn profile_changeset_skips_unset_fields() {
        let update = ProfileUpdate {
            bio: Some("Cook".to_owned()),
            ..ProfileUpdate::default()
        };
        let changeset = ProfileChangeset::new(&update, Utc::now());
        assert_eq!(changeset.bio, Some("Cook"));
        assert_eq!(changeset.first_name, None);
        assert_eq!(changeset.address, None);
    }

    #[rstest]
    fn availability_survives_jsonb() {
        let json = serde_json::json!({"monday": {"start": "09:00", "end": "17:00"}});
        let at = Utc::now();
        let row = ProviderServiceRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            service_type: "plumbing".to_owned(),
            description: "pipes".to_owned(),
            rate_per_hour: 3000.0,
            experience_years: 4,
            availability: json,
            address: "3 Opebi Road, Ikeja, Lagos, Nigeria".to_owned(),
            created_at: at,
            updated_at: at,
        };
        let service = row.into_domain().expect("valid row");
        assert_eq!(service.details.availability.monday.start, "09:00");
        assert!(service.details.availability.sunday.start.is_empty());
    }
}

//! Booking lifecycle service.
//!
//! Implements [`BookingCommand`] and [`BookingQuery`]. Every guard follows the
//! same precedence: the booking must exist, then the actor must be entitled
//! to act, then the booking must be in a state that allows the change.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    BookingCommand, BookingFilter, BookingQuery, BookingRepository, BookingRepositoryError,
    BookingTransition, CreateBookingRequest, ServicePricingRepository, UserRepository,
};
use crate::domain::{
    Address, Booking, BookingDraft, BookingSchedule, BookingStatus, BookingType, Capability,
    Error, Invitation, NewNotification, PricingResolver, ServiceType, User, UserId, authorize,
    map_user_repository_error, messages,
};

pub(crate) fn map_booking_repository_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking repository unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking repository error: {message}"))
        }
        BookingRepositoryError::StaleState { message } => Error::conflict(message),
    }
}

pub(crate) fn booking_not_found(booking_id: Uuid) -> Error {
    Error::not_found(format!("booking {booking_id} not found"))
}

fn invalid_field(field: &str, value: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code,
    }))
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        invalid_field(
            field,
            raw,
            "invalid_date",
            format!("{field} must be a YYYY-MM-DD date"),
        )
    })
}

/// Combine a date with a time of day. Times without an offset are UTC.
fn parse_time(field: &str, date: NaiveDate, raw: &str) -> Result<DateTime<Utc>, Error> {
    let combined = format!("{date}T{raw}");
    DateTime::parse_from_rfc3339(&combined)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&combined, "%Y-%m-%dT%H:%M:%S").map(|naive| naive.and_utc())
        })
        .map_err(|_| {
            invalid_field(
                field,
                raw,
                "invalid_time",
                format!("{field} must be an HH:MM:SS time"),
            )
        })
}

fn parse_schedule(request: &CreateBookingRequest) -> Result<BookingSchedule, Error> {
    let start_date = parse_date("startDate", &request.start_date)?;
    let end_date = parse_date("endDate", &request.end_date)?;
    let start_time = parse_time("startTime", start_date, &request.start_time)?;
    let end_time = parse_time("endTime", end_date, &request.end_time)?;
    Ok(BookingSchedule {
        start_date,
        end_date,
        start_time,
        end_time,
    })
}

/// Booking lifecycle service implementing the booking driving ports.
pub struct BookingService<B, P, U> {
    booking_repo: Arc<B>,
    pricing: PricingResolver<P>,
    user_repo: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<B, P, U> BookingService<B, P, U>
where
    P: ServicePricingRepository,
{
    pub fn new(
        booking_repo: Arc<B>,
        pricing_repo: Arc<P>,
        user_repo: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            booking_repo,
            pricing: PricingResolver::new(pricing_repo),
            user_repo,
            clock,
        }
    }
}

impl<B, P, U> BookingService<B, P, U>
where
    B: BookingRepository,
{
    async fn load(&self, booking_id: Uuid) -> Result<Booking, Error> {
        self.booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(map_booking_repository_error)?
            .ok_or_else(|| booking_not_found(booking_id))
    }

    /// Shared accept/reject guards. Returns the open booking.
    async fn load_for_invitee(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        let booking = self.load(booking_id).await?;
        if booking.status() != BookingStatus::Open {
            return Err(Error::forbidden("booking is no longer open"));
        }
        authorize(
            actor,
            Capability::ProvideServices,
            "service requesters cannot respond to bookings",
        )?;

        let rejected = self
            .booking_repo
            .has_rejected(booking_id, &actor.id)
            .await
            .map_err(map_booking_repository_error)?;
        if rejected {
            return Err(Error::forbidden("booking was already rejected by this provider"));
        }

        let invitation = self
            .booking_repo
            .find_invitation(booking_id, &actor.id)
            .await
            .map_err(map_booking_repository_error)?;
        if invitation.is_none() {
            return Err(Error::forbidden("provider was not invited to this booking"));
        }
        Ok(booking)
    }

    async fn apply(&self, transition: BookingTransition, at: DateTime<Utc>) -> Result<(), Error> {
        self.booking_repo
            .apply_transition(&transition, at)
            .await
            .map_err(map_booking_repository_error)
    }
}

fn transitioned(
    booking: &Booking,
    status: BookingStatus,
    provider_id: Option<UserId>,
    at: DateTime<Utc>,
) -> Result<Booking, Error> {
    booking
        .transitioned(status, provider_id, at)
        .map_err(|err| Error::internal(format!("invalid booking transition: {err}")))
}

#[async_trait]
impl<B, P, U> BookingCommand for BookingService<B, P, U>
where
    B: BookingRepository,
    P: ServicePricingRepository,
    U: UserRepository,
{
    async fn create_booking(
        &self,
        actor: &User,
        request: CreateBookingRequest,
    ) -> Result<Booking, Error> {
        authorize(
            actor,
            Capability::RequestServices,
            "service providers cannot create bookings",
        )?;

        let address = Address::new(request.address.as_str()).map_err(|err| {
            invalid_field("address", &request.address, "invalid_address", err.to_string())
        })?;
        let service_type = ServiceType::from_str(&request.service_type).map_err(|err| {
            invalid_field(
                "serviceType",
                &request.service_type,
                "invalid_service_type",
                err.to_string(),
            )
        })?;
        let booking_type = BookingType::from_str(&request.booking_type).map_err(|err| {
            invalid_field(
                "bookingType",
                &request.booking_type,
                "invalid_booking_type",
                err.to_string(),
            )
        })?;
        let schedule = parse_schedule(&request)?;

        let total_price = self
            .pricing
            .price(service_type, booking_type, &schedule)
            .await?;

        let now = self.clock.utc();
        let booking = Booking::new(BookingDraft {
            id: Uuid::new_v4(),
            requester_id: actor.id.clone(),
            provider_id: None,
            address,
            service_type,
            booking_type,
            description: request.description,
            schedule,
            total_price,
            actual_price: 0.0,
            status: BookingStatus::Open,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.booking_repo
            .create(&booking)
            .await
            .map_err(map_booking_repository_error)?;
        info!(booking_id = %booking.id(), %service_type, total_price, "booking created");
        Ok(booking)
    }

    async fn update_status(
        &self,
        actor: &User,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, Error> {
        if !matches!(status, BookingStatus::Completed | BookingStatus::Canceled) {
            return Err(invalid_field(
                "status",
                status.as_str(),
                "invalid_status",
                "status must be completed or canceled",
            ));
        }

        let booking = self.load(booking_id).await?;
        if !booking.is_requester(&actor.id) {
            return Err(Error::forbidden("only the requester may update booking status"));
        }

        let now = self.clock.utc();
        let provider = booking.provider_id().cloned();
        let notify = |message: &str| {
            provider
                .clone()
                .map(|provider_id| NewNotification::booking(provider_id, booking_id, message))
        };

        let transition = match status {
            BookingStatus::Completed => {
                if booking.status() != BookingStatus::InProgress {
                    return Err(Error::forbidden("only in-progress bookings can be completed"));
                }
                if !booking.schedule().is_due(now) {
                    return Err(Error::invalid_request("booking not yet due"));
                }
                BookingTransition::Complete {
                    booking_id,
                    notification: notify(messages::COMPLETED),
                }
            }
            _ => {
                if !booking.status().can_transition_to(BookingStatus::Canceled) {
                    return Err(Error::forbidden(format!(
                        "a {} booking cannot be canceled",
                        booking.status()
                    )));
                }
                BookingTransition::Cancel {
                    booking_id,
                    from: booking.status(),
                    notification: notify(messages::CANCELED),
                }
            }
        };

        self.apply(transition, now).await?;
        info!(%booking_id, %status, "booking status updated");
        transitioned(&booking, status, provider, now)
    }

    async fn select_provider(
        &self,
        actor: &User,
        booking_id: Uuid,
        provider_id: &UserId,
    ) -> Result<Invitation, Error> {
        let booking = self.load(booking_id).await?;
        if !booking.is_requester(&actor.id) {
            return Err(Error::forbidden("only the requester may select a provider"));
        }
        if booking.status() != BookingStatus::Open {
            return Err(Error::forbidden("booking is no longer open"));
        }
        if provider_id == &actor.id {
            return Err(invalid_field(
                "providerId",
                provider_id.as_ref(),
                "self_selection",
                "requester cannot select themselves",
            ));
        }

        let provider = self
            .user_repo
            .find_by_id(provider_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {provider_id} not found")))?;
        authorize(
            &provider,
            Capability::ProvideServices,
            "selected user does not provide services",
        )?;

        if let Some(existing) = self
            .booking_repo
            .find_invitation(booking_id, provider_id)
            .await
            .map_err(map_booking_repository_error)?
        {
            return Ok(existing);
        }

        let now = self.clock.utc();
        let invitation = Invitation::pending(booking_id, provider_id.clone(), now);
        self.apply(
            BookingTransition::Invite {
                invitation: invitation.clone(),
                notification: NewNotification::booking(
                    provider_id.clone(),
                    booking_id,
                    messages::selected(booking_id),
                ),
            },
            now,
        )
        .await?;
        info!(%booking_id, %provider_id, "provider invited");
        Ok(invitation)
    }

    async fn accept(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        let booking = self.load_for_invitee(actor, booking_id).await?;
        let now = self.clock.utc();
        self.apply(
            BookingTransition::Accept {
                booking_id,
                provider_id: actor.id.clone(),
                notification: NewNotification::booking(
                    booking.requester_id().clone(),
                    booking_id,
                    messages::ACCEPTED,
                ),
            },
            now,
        )
        .await?;
        info!(%booking_id, provider_id = %actor.id, "booking accepted");
        transitioned(&booking, BookingStatus::InProgress, Some(actor.id.clone()), now)
    }

    async fn reject(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        let booking = self.load_for_invitee(actor, booking_id).await?;
        self.apply(
            BookingTransition::Reject {
                booking_id,
                provider_id: actor.id.clone(),
                notification: NewNotification::booking(
                    booking.requester_id().clone(),
                    booking_id,
                    messages::REJECTED,
                ),
            },
            self.clock.utc(),
        )
        .await?;
        info!(%booking_id, provider_id = %actor.id, "booking rejected");
        Ok(booking)
    }
}

#[async_trait]
impl<B, P, U> BookingQuery for BookingService<B, P, U>
where
    B: BookingRepository,
    P: ServicePricingRepository,
    U: UserRepository,
{
    async fn get_booking(&self, actor: &User, booking_id: Uuid) -> Result<Booking, Error> {
        let booking = self.load(booking_id).await?;
        let visible = booking.is_requester(&actor.id)
            || booking.is_provider(&actor.id)
            || actor.can(Capability::ViewAllBookings);
        if !visible {
            return Err(Error::forbidden("booking belongs to other users"));
        }
        Ok(booking)
    }

    async fn list_bookings(
        &self,
        actor: &User,
        mut filter: BookingFilter,
        page: PageRequest,
    ) -> Result<Page<Booking>, Error> {
        if !actor.can(Capability::ViewAllBookings) {
            filter.participant = Some(actor.id.clone());
        }
        let items = self
            .booking_repo
            .list(&filter, page)
            .await
            .map_err(map_booking_repository_error)?;
        Ok(Page::new(items, page))
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;

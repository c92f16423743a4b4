//! Provider matching for open bookings.
//!
//! Candidates share the booking's city, state and country and offer its
//! service type. Each candidate is annotated with a travel estimate from its
//! own address to the booking address; estimates for one page are requested
//! concurrently and any failure degrades to [`UNKNOWN_ESTIMATE`].

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use pagination::{Page, PageRequest};
use tracing::{debug, warn};
use uuid::Uuid;

use super::booking_service::{booking_not_found, map_booking_repository_error};
use crate::domain::ports::{
    BookingRepository, DistanceEstimator, MatchCriteria, ProviderMatch, ProviderMatchingQuery,
    ProviderServiceRepository, ProviderServiceRepositoryError,
};
use crate::domain::{BookingStatus, Error, ProviderService, User};

/// Distance and duration reported when the estimator cannot answer.
pub const UNKNOWN_ESTIMATE: &str = "unknown";

pub(crate) fn map_provider_service_error(error: ProviderServiceRepositoryError) -> Error {
    match error {
        ProviderServiceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("provider service repository unavailable: {message}"))
        }
        ProviderServiceRepositoryError::Query { message } => {
            Error::internal(format!("provider service repository error: {message}"))
        }
        ProviderServiceRepositoryError::Conflict { message } => {
            Error::conflict(format!("provider service already exists: {message}"))
        }
    }
}

/// Matching service implementing [`ProviderMatchingQuery`].
pub struct ProviderMatchingService<B, S> {
    booking_repo: Arc<B>,
    service_repo: Arc<S>,
    estimator: Arc<dyn DistanceEstimator>,
}

impl<B, S> ProviderMatchingService<B, S> {
    pub fn new(
        booking_repo: Arc<B>,
        service_repo: Arc<S>,
        estimator: Arc<dyn DistanceEstimator>,
    ) -> Self {
        Self {
            booking_repo,
            service_repo,
            estimator,
        }
    }

    async fn annotate(&self, service: ProviderService, destination: &str) -> ProviderMatch {
        match self
            .estimator
            .estimate(service.details.address.as_str(), destination)
            .await
        {
            Ok(estimate) => ProviderMatch {
                service,
                distance: estimate.distance,
                duration: estimate.duration,
            },
            Err(err) => {
                warn!(service_id = %service.id, error = %err, kind = err.kind(), "travel estimate unavailable");
                ProviderMatch {
                    service,
                    distance: UNKNOWN_ESTIMATE.to_owned(),
                    duration: UNKNOWN_ESTIMATE.to_owned(),
                }
            }
        }
    }
}

#[async_trait]
impl<B, S> ProviderMatchingQuery for ProviderMatchingService<B, S>
where
    B: BookingRepository,
    S: ProviderServiceRepository,
{
    async fn find_providers(
        &self,
        actor: &User,
        booking_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ProviderMatch>, Error> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(map_booking_repository_error)?
            .ok_or_else(|| booking_not_found(booking_id))?;
        if !booking.is_requester(&actor.id) {
            return Err(Error::forbidden("only the requester may search for providers"));
        }
        if booking.status() != BookingStatus::Open {
            return Err(Error::forbidden("booking is no longer open"));
        }

        let criteria = MatchCriteria {
            locality_suffix: booking.address().locality().suffix(),
            service_type: booking.service_type(),
            requester_id: actor.id.clone(),
        };
        let candidates = self
            .service_repo
            .find_matching(&criteria, page)
            .await
            .map_err(map_provider_service_error)?;
        debug!(%booking_id, candidates = candidates.len(), "matching providers found");

        let destination = booking.address().as_str();
        let matches = join_all(
            candidates
                .into_iter()
                .map(|service| self.annotate(service, destination)),
        )
        .await;
        Ok(Page::new(matches, page))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{
        DistanceEstimatorError, MockBookingRepository, MockDistanceEstimator,
        MockProviderServiceRepository, TravelEstimate,
    };
    use crate::domain::service_test_support::{
        ADDRESS, booking, fixture_timestamp, provider, requester,
    };
    use crate::domain::{
        Address, Availability, ErrorCode, ProviderServiceDetails, ServiceType, UserId,
    };

    fn offering(address: &str) -> ProviderService {
        ProviderService {
            id: Uuid::new_v4(),
            user_id: UserId::random(),
            service_type: ServiceType::Cleaning,
            details: ProviderServiceDetails {
                description: "deep cleaning".to_owned(),
                rate_per_hour: 4000.0,
                experience_years: 3,
                availability: Availability::default(),
                address: Address::new(address).expect("valid address"),
            },
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        }
    }

    #[tokio::test]
    async fn failed_estimates_degrade_to_unknown() {
        let owner = requester();
        let stored = booking(&owner.id, BookingStatus::Open, None);
        let booking_id = stored.id();

        let mut bookings = MockBookingRepository::new();
        bookings
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        let mut services = MockProviderServiceRepository::new();
        let owner_id = owner.id.clone();
        services
            .expect_find_matching()
            .withf(move |criteria, _| {
                criteria.locality_suffix == "Ikeja, Lagos, Nigeria"
                    && criteria.service_type == ServiceType::Cleaning
                    && criteria.requester_id == owner_id
            })
            .times(1)
            .return_once(|_, _| {
                Ok(vec![
                    offering("3 Opebi Road, Ikeja, Lagos, Nigeria"),
                    offering("9 Awolowo Way, Ikeja, Lagos, Nigeria"),
                ])
            });
        let mut estimator = MockDistanceEstimator::new();
        estimator
            .expect_estimate()
            .withf(|origin, destination| origin.starts_with("3 Opebi") && destination == ADDRESS)
            .returning(|_, _| {
                Ok(TravelEstimate {
                    distance: "2.4 km".to_owned(),
                    duration: "9 mins".to_owned(),
                })
            });
        estimator
            .expect_estimate()
            .returning(|_, _| Err(DistanceEstimatorError::timeout("no answer")));

        let service =
            ProviderMatchingService::new(Arc::new(bookings), Arc::new(services), Arc::new(estimator));
        let page = service
            .find_providers(&owner, booking_id, PageRequest::default())
            .await
            .expect("providers found");

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].distance, "2.4 km");
        assert_eq!(page.items[1].distance, UNKNOWN_ESTIMATE);
        assert_eq!(page.items[1].duration, UNKNOWN_ESTIMATE);
    }

    #[tokio::test]
    async fn only_requester_searches() {
        let stored = booking(&UserId::random(), BookingStatus::Open, None);
        let booking_id = stored.id();
        let mut bookings = MockBookingRepository::new();
        bookings
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        let mut services = MockProviderServiceRepository::new();
        services.expect_find_matching().times(0);

        let service = ProviderMatchingService::new(
            Arc::new(bookings),
            Arc::new(services),
            Arc::new(MockDistanceEstimator::new()),
        );
        let error = service
            .find_providers(&provider(), booking_id, PageRequest::default())
            .await
            .expect_err("forbidden");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn closed_bookings_are_not_searchable() {
        let owner = requester();
        let stored = booking(&owner.id, BookingStatus::InProgress, Some(&UserId::random()));
        let booking_id = stored.id();
        let mut bookings = MockBookingRepository::new();
        bookings
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));

        let service = ProviderMatchingService::new(
            Arc::new(bookings),
            Arc::new(MockProviderServiceRepository::new()),
            Arc::new(MockDistanceEstimator::new()),
        );
        let error = service
            .find_providers(&owner, booking_id, PageRequest::default())
            .await
            .expect_err("not open");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}

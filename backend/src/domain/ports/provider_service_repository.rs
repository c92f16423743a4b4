//! Port for provider service offerings, their images, and provider matching.

use async_trait::async_trait;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{ProviderService, ServiceImage, ServiceType, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by provider service repository adapters.
    pub enum ProviderServiceRepositoryError {
        /// Repository connection could not be established.
        Connection => "provider service repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "provider service repository query failed: {message}",
        /// The provider already offers this service type.
        Conflict => "provider service already exists: {message}",
    }
}

/// Candidate selection for a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCriteria {
    /// Case-insensitive `"{city}, {state}, {country}"` suffix the offering's
    /// address must end with.
    pub locality_suffix: String,
    pub service_type: ServiceType,
    /// Excluded from the results.
    pub requester_id: UserId,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderServiceRepository: Send + Sync {
    /// Insert a new offering.
    async fn create(&self, service: &ProviderService) -> Result<(), ProviderServiceRepositoryError>;

    /// The offering of `service_type` owned by `user_id`.
    async fn find(
        &self,
        user_id: &UserId,
        service_type: ServiceType,
    ) -> Result<Option<ProviderService>, ProviderServiceRepositoryError>;

    /// Every offering owned by `user_id`.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProviderService>, ProviderServiceRepositoryError>;

    /// Replace the details of an existing offering. `false` when missing.
    async fn update(&self, service: &ProviderService) -> Result<bool, ProviderServiceRepositoryError>;

    /// Remove an offering. `false` when missing.
    async fn delete(
        &self,
        user_id: &UserId,
        service_type: ServiceType,
    ) -> Result<bool, ProviderServiceRepositoryError>;

    /// Record an uploaded image.
    async fn insert_image(&self, image: &ServiceImage) -> Result<(), ProviderServiceRepositoryError>;

    /// Images attached to one offering, oldest first.
    async fn list_images(
        &self,
        user_id: &UserId,
        service_type: ServiceType,
    ) -> Result<Vec<ServiceImage>, ProviderServiceRepositoryError>;

    /// One image owned by `user_id`.
    async fn find_image(
        &self,
        user_id: &UserId,
        image_id: Uuid,
    ) -> Result<Option<ServiceImage>, ProviderServiceRepositoryError>;

    /// Remove an image row. `false` when missing.
    async fn delete_image(
        &self,
        user_id: &UserId,
        image_id: Uuid,
    ) -> Result<bool, ProviderServiceRepositoryError>;

    /// Offerings matching `criteria` whose owners have no in-progress
    /// booking, ordered by creation time.
    async fn find_matching(
        &self,
        criteria: &MatchCriteria,
        page: PageRequest,
    ) -> Result<Vec<ProviderService>, ProviderServiceRepositoryError>;
}

/// Fixture repository with no offerings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProviderServiceRepository;

#[async_trait]
impl ProviderServiceRepository for FixtureProviderServiceRepository {
    async fn create(&self, _service: &ProviderService) -> Result<(), ProviderServiceRepositoryError> {
        Ok(())
    }

    async fn find(
        &self,
        _user_id: &UserId,
        _service_type: ServiceType,
    ) -> Result<Option<ProviderService>, ProviderServiceRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ProviderService>, ProviderServiceRepositoryError> {
        Ok(Vec::new())
    }

    async fn update(&self, _service: &ProviderService) -> Result<bool, ProviderServiceRepositoryError> {
        Ok(false)
    }

    async fn delete(
        &self,
        _user_id: &UserId,
        _service_type: ServiceType,
    ) -> Result<bool, ProviderServiceRepositoryError> {
        Ok(false)
    }

    async fn insert_image(&self, _image: &ServiceImage) -> Result<(), ProviderServiceRepositoryError> {
        Ok(())
    }

    async fn list_images(
        &self,
        _user_id: &UserId,
        _service_type: ServiceType,
    ) -> Result<Vec<ServiceImage>, ProviderServiceRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_image(
        &self,
        _user_id: &UserId,
        _image_id: Uuid,
    ) -> Result<Option<ServiceImage>, ProviderServiceRepositoryError> {
        Ok(None)
    }

    async fn delete_image(
        &self,
        _user_id: &UserId,
        _image_id: Uuid,
    ) -> Result<bool, ProviderServiceRepositoryError> {
        Ok(false)
    }

    async fn find_matching(
        &self,
        _criteria: &MatchCriteria,
        _page: PageRequest,
    ) -> Result<Vec<ProviderService>, ProviderServiceRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_matches_nobody() {
        let criteria = MatchCriteria {
            locality_suffix: "Ikeja, Lagos, Nigeria".to_owned(),
            service_type: ServiceType::Cleaning,
            requester_id: UserId::random(),
        };
        let found = FixtureProviderServiceRepository
            .find_matching(&criteria, PageRequest::default())
            .await
            .expect("fixture search succeeds");
        assert!(found.is_empty());
    }
}

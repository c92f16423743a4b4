//! Driving port for a provider's own service offerings and images.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, ProviderService, ProviderServiceDetails, ServiceImage, ServiceType, User, UserId};

/// One image in an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// MIME type as submitted.
    pub content_type: String,
    /// Base64 encoded image bytes.
    pub data: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderCatalogueCommand: Send + Sync {
    /// Offer a new service type.
    async fn create_service(
        &self,
        actor: &User,
        service_type: ServiceType,
        details: ProviderServiceDetails,
    ) -> Result<ProviderService, Error>;

    /// Replace the details of one of the actor's offerings.
    async fn update_service(
        &self,
        actor: &User,
        service_type: ServiceType,
        details: ProviderServiceDetails,
    ) -> Result<ProviderService, Error>;

    /// One of the actor's offerings.
    async fn get_service(&self, actor: &User, service_type: ServiceType) -> Result<ProviderService, Error>;

    /// Every offering of `owner`.
    async fn list_services(&self, owner: &UserId) -> Result<Vec<ProviderService>, Error>;

    /// Withdraw one of the actor's offerings.
    async fn delete_service(&self, actor: &User, service_type: ServiceType) -> Result<(), Error>;

    /// Store a batch of images against one of the actor's offerings.
    async fn upload_images(
        &self,
        actor: &User,
        service_type: ServiceType,
        images: Vec<ImageUpload>,
    ) -> Result<Vec<ServiceImage>, Error>;

    /// Images attached to one of the actor's offerings.
    async fn list_images(&self, actor: &User, service_type: ServiceType) -> Result<Vec<ServiceImage>, Error>;

    /// Remove one of the actor's images from storage and the catalogue.
    async fn delete_image(&self, actor: &User, image_id: Uuid) -> Result<(), Error>;
}

/// Fixture catalogue with no offerings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProviderCatalogueCommand;

fn no_service(service_type: ServiceType) -> Error {
    Error::not_found(format!("no {service_type} service found"))
}

#[async_trait]
impl ProviderCatalogueCommand for FixtureProviderCatalogueCommand {
    async fn create_service(
        &self,
        _actor: &User,
        _service_type: ServiceType,
        _details: ProviderServiceDetails,
    ) -> Result<ProviderService, Error> {
        Err(Error::service_unavailable("catalogue store is not configured"))
    }

    async fn update_service(
        &self,
        _actor: &User,
        service_type: ServiceType,
        _details: ProviderServiceDetails,
    ) -> Result<ProviderService, Error> {
        Err(no_service(service_type))
    }

    async fn get_service(&self, _actor: &User, service_type: ServiceType) -> Result<ProviderService, Error> {
        Err(no_service(service_type))
    }

    async fn list_services(&self, _owner: &UserId) -> Result<Vec<ProviderService>, Error> {
        Ok(Vec::new())
    }

    async fn delete_service(&self, _actor: &User, service_type: ServiceType) -> Result<(), Error> {
        Err(no_service(service_type))
    }

    async fn upload_images(
        &self,
        _actor: &User,
        service_type: ServiceType,
        _images: Vec<ImageUpload>,
    ) -> Result<Vec<ServiceImage>, Error> {
        Err(no_service(service_type))
    }

    async fn list_images(&self, _actor: &User, _service_type: ServiceType) -> Result<Vec<ServiceImage>, Error> {
        Ok(Vec::new())
    }

    async fn delete_image(&self, _actor: &User, image_id: Uuid) -> Result<(), Error> {
        Err(Error::not_found(format!("image {image_id} not found")))
    }
}

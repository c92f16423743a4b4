//! Provider offerings and their image galleries.
//!
//! Images are validated as a batch before anything is stored. Uploads then
//! run with at most [`MAX_CONCURRENT_UPLOADS`] in flight; the first failure
//! is returned and nothing further is scheduled.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::{StreamExt, stream};
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::matching_service::map_provider_service_error;
use crate::domain::ports::{
    ImageUpload, ObjectStorage, ObjectStorageError, ProviderCatalogueCommand,
    ProviderServiceRepository,
};
use crate::domain::{
    Capability, Error, ImageContentType, ProviderService, ProviderServiceDetails, ServiceImage,
    ServiceType, User, UserId, authorize, image_storage_key,
};

/// Upper bound on concurrent storage uploads for one batch.
pub const MAX_CONCURRENT_UPLOADS: usize = 4;

const MAX_IMAGES_PER_BATCH: usize = 10;

fn map_storage_error(error: ObjectStorageError) -> Error {
    match error {
        ObjectStorageError::Io { message } => {
            Error::service_unavailable(format!("image storage unavailable: {message}"))
        }
        ObjectStorageError::InvalidKey { message } => {
            Error::internal(format!("image storage rejected key: {message}"))
        }
    }
}

fn service_not_found(service_type: ServiceType) -> Error {
    Error::not_found(format!("no {service_type} service found"))
}

fn validate_details(details: &ProviderServiceDetails) -> Result<(), Error> {
    details.validate().map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "details",
            "code": "invalid_service_details",
        }))
    })
}

/// Decode and type-check one upload. `index` is reported in error details.
fn decode_upload(index: usize, upload: &ImageUpload) -> Result<(ImageContentType, Vec<u8>), Error> {
    let content_type = ImageContentType::parse(&upload.content_type).ok_or_else(|| {
        Error::invalid_request("images must be image/jpeg or image/png").with_details(json!({
            "field": format!("images[{index}].contentType"),
            "value": upload.content_type,
            "code": "unsupported_content_type",
        }))
    })?;
    let bytes = STANDARD.decode(upload.data.as_bytes()).map_err(|err| {
        Error::invalid_request(format!("image {index} is not valid base64: {err}")).with_details(
            json!({
                "field": format!("images[{index}].data"),
                "code": "invalid_base64",
            }),
        )
    })?;
    if bytes.is_empty() {
        return Err(Error::invalid_request(format!("image {index} is empty")));
    }
    Ok((content_type, bytes))
}

/// Catalogue service implementing [`ProviderCatalogueCommand`].
pub struct ProviderCatalogueService<S> {
    service_repo: Arc<S>,
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn Clock>,
}

impl<S> ProviderCatalogueService<S> {
    pub fn new(service_repo: Arc<S>, storage: Arc<dyn ObjectStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            service_repo,
            storage,
            clock,
        }
    }
}

impl<S> ProviderCatalogueService<S>
where
    S: ProviderServiceRepository,
{
    async fn find_own(&self, owner: &UserId, service_type: ServiceType) -> Result<ProviderService, Error> {
        self.service_repo
            .find(owner, service_type)
            .await
            .map_err(map_provider_service_error)?
            .ok_or_else(|| service_not_found(service_type))
    }

    async fn store_image(
        &self,
        owner: &UserId,
        service_type: ServiceType,
        content_type: ImageContentType,
        bytes: Vec<u8>,
    ) -> Result<ServiceImage, Error> {
        let id = Uuid::new_v4();
        let key = image_storage_key(service_type, owner, id);
        let url = self
            .storage
            .upload(&key, content_type, bytes)
            .await
            .map_err(map_storage_error)?;
        let image = ServiceImage {
            id,
            user_id: owner.clone(),
            service_type,
            url,
            created_at: self.clock.utc(),
        };
        self.service_repo
            .insert_image(&image)
            .await
            .map_err(map_provider_service_error)?;
        Ok(image)
    }
}

#[async_trait]
impl<S> ProviderCatalogueCommand for ProviderCatalogueService<S>
where
    S: ProviderServiceRepository,
{
    async fn create_service(
        &self,
        actor: &User,
        service_type: ServiceType,
        details: ProviderServiceDetails,
    ) -> Result<ProviderService, Error> {
        authorize(actor, Capability::ProvideServices, "requesters cannot offer services")?;
        validate_details(&details)?;

        let now = self.clock.utc();
        let service = ProviderService {
            id: Uuid::new_v4(),
            user_id: actor.id.clone(),
            service_type,
            details,
            created_at: now,
            updated_at: now,
        };
        self.service_repo
            .create(&service)
            .await
            .map_err(map_provider_service_error)?;
        info!(user_id = %actor.id, %service_type, "provider service created");
        Ok(service)
    }

    async fn update_service(
        &self,
        actor: &User,
        service_type: ServiceType,
        details: ProviderServiceDetails,
    ) -> Result<ProviderService, Error> {
        authorize(actor, Capability::ProvideServices, "requesters cannot offer services")?;
        validate_details(&details)?;

        let existing = self.find_own(&actor.id, service_type).await?;
        let updated = ProviderService {
            details,
            updated_at: self.clock.utc(),
            ..existing
        };
        let found = self
            .service_repo
            .update(&updated)
            .await
            .map_err(map_provider_service_error)?;
        if !found {
            return Err(service_not_found(service_type));
        }
        Ok(updated)
    }

    async fn get_service(&self, actor: &User, service_type: ServiceType) -> Result<ProviderService, Error> {
        self.find_own(&actor.id, service_type).await
    }

    async fn list_services(&self, owner: &UserId) -> Result<Vec<ProviderService>, Error> {
        self.service_repo
            .list_for_user(owner)
            .await
            .map_err(map_provider_service_error)
    }

    async fn delete_service(&self, actor: &User, service_type: ServiceType) -> Result<(), Error> {
        let deleted = self
            .service_repo
            .delete(&actor.id, service_type)
            .await
            .map_err(map_provider_service_error)?;
        if !deleted {
            return Err(service_not_found(service_type));
        }
        info!(user_id = %actor.id, %service_type, "provider service deleted");
        Ok(())
    }

    async fn upload_images(
        &self,
        actor: &User,
        service_type: ServiceType,
        images: Vec<ImageUpload>,
    ) -> Result<Vec<ServiceImage>, Error> {
        self.find_own(&actor.id, service_type).await?;
        if images.is_empty() || images.len() > MAX_IMAGES_PER_BATCH {
            return Err(Error::invalid_request(format!(
                "upload between 1 and {MAX_IMAGES_PER_BATCH} images"
            ))
            .with_details(json!({
                "field": "images",
                "value": images.len(),
                "code": "invalid_batch_size",
            })));
        }
        let decoded = images
            .iter()
            .enumerate()
            .map(|(index, upload)| decode_upload(index, upload))
            .collect::<Result<Vec<_>, _>>()?;

        let owner = &actor.id;
        let mut uploads = stream::iter(decoded)
            .map(move |(content_type, bytes)| {
                self.store_image(owner, service_type, content_type, bytes)
            })
            .buffer_unordered(MAX_CONCURRENT_UPLOADS);
        let mut stored = Vec::with_capacity(images.len());
        while let Some(result) = uploads.next().await {
            match result {
                Ok(image) => stored.push(image),
                Err(err) => {
                    warn!(user_id = %owner, %service_type, uploaded = stored.len(), error = %err, "image batch aborted");
                    return Err(err);
                }
            }
        }
        info!(user_id = %owner, %service_type, count = stored.len(), "service images uploaded");
        Ok(stored)
    }

    async fn list_images(&self, actor: &User, service_type: ServiceType) -> Result<Vec<ServiceImage>, Error> {
        self.service_repo
            .list_images(&actor.id, service_type)
            .await
            .map_err(map_provider_service_error)
    }

    async fn delete_image(&self, actor: &User, image_id: Uuid) -> Result<(), Error> {
        let image = self
            .service_repo
            .find_image(&actor.id, image_id)
            .await
            .map_err(map_provider_service_error)?
            .ok_or_else(|| Error::not_found(format!("image {image_id} not found")))?;
        self.storage
            .delete(&image.storage_key())
            .await
            .map_err(map_storage_error)?;
        let deleted = self
            .service_repo
            .delete_image(&actor.id, image_id)
            .await
            .map_err(map_provider_service_error)?;
        if !deleted {
            return Err(Error::not_found(format!("image {image_id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "provider_catalogue_service_tests.rs"]
mod tests;

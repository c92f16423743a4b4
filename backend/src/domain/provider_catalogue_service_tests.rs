//! Tests for provider offerings and image uploads.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockObjectStorage, MockProviderServiceRepository, ProviderServiceRepositoryError,
};
use crate::domain::service_test_support::{fixture_clock, fixture_timestamp, provider, requester};
use crate::domain::{Address, Availability, ErrorCode};

#[fixture]
fn details() -> ProviderServiceDetails {
    ProviderServiceDetails {
        description: "deep cleaning".to_owned(),
        rate_per_hour: 4000.0,
        experience_years: 2,
        availability: Availability::default(),
        address: Address::new("3 Opebi Road, Ikeja, Lagos, Nigeria").expect("valid address"),
    }
}

fn offering(owner: &UserId, details: ProviderServiceDetails) -> ProviderService {
    ProviderService {
        id: Uuid::new_v4(),
        user_id: owner.clone(),
        service_type: ServiceType::Cleaning,
        details,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

fn jpeg() -> ImageUpload {
    ImageUpload {
        content_type: "image/jpeg".to_owned(),
        data: STANDARD.encode(b"\xff\xd8\xff\xe0 fixture"),
    }
}

fn service(
    repo: MockProviderServiceRepository,
    storage: MockObjectStorage,
) -> ProviderCatalogueService<MockProviderServiceRepository> {
    ProviderCatalogueService::new(Arc::new(repo), Arc::new(storage), fixture_clock())
}

fn repo_with_offering(owner: &UserId, details: ProviderServiceDetails) -> MockProviderServiceRepository {
    let existing = offering(owner, details);
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_find()
        .with(eq(owner.clone()), eq(ServiceType::Cleaning))
        .return_once(move |_, _| Ok(Some(existing)));
    repo
}

#[rstest]
#[tokio::test]
async fn requesters_cannot_offer_services(details: ProviderServiceDetails) {
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_create().times(0);

    let error = service(repo, MockObjectStorage::new())
        .create_service(&requester(), ServiceType::Cleaning, details)
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn create_rejects_invalid_details(mut details: ProviderServiceDetails) {
    details.rate_per_hour = 0.0;
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_create().times(0);

    let error = service(repo, MockObjectStorage::new())
        .create_service(&provider(), ServiceType::Cleaning, details)
        .await
        .expect_err("invalid");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn duplicate_offering_conflicts(details: ProviderServiceDetails) {
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_create()
        .return_once(|_| Err(ProviderServiceRepositoryError::conflict("cleaning")));

    let error = service(repo, MockObjectStorage::new())
        .create_service(&provider(), ServiceType::Cleaning, details)
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn update_keeps_identity_and_replaces_details(details: ProviderServiceDetails) {
    let actor = provider();
    let mut repo = repo_with_offering(&actor.id, details.clone());
    repo.expect_update()
        .withf(|service| service.details.rate_per_hour == 6000.0)
        .times(1)
        .return_once(|_| Ok(true));
    let changed = ProviderServiceDetails {
        rate_per_hour: 6000.0,
        ..details
    };

    let updated = service(repo, MockObjectStorage::new())
        .update_service(&actor, ServiceType::Cleaning, changed)
        .await
        .expect("updated");

    assert_eq!(updated.user_id, actor.id);
    assert_eq!(updated.details.rate_per_hour, 6000.0);
}

#[rstest]
#[tokio::test]
async fn upload_stores_each_image(details: ProviderServiceDetails) {
    let actor = provider();
    let mut repo = repo_with_offering(&actor.id, details);
    repo.expect_insert_image().times(3).returning(|_| Ok(()));
    let mut storage = MockObjectStorage::new();
    let prefix = format!("profiles/services/cleaning/{}/", actor.id);
    storage
        .expect_upload()
        .withf(move |key, content_type, bytes| {
            key.starts_with(&prefix) && *content_type == ImageContentType::Jpeg && !bytes.is_empty()
        })
        .times(3)
        .returning(|key, _, _| Ok(format!("https://cdn.invalid/{key}")));

    let images = service(repo, storage)
        .upload_images(&actor, ServiceType::Cleaning, vec![jpeg(), jpeg(), jpeg()])
        .await
        .expect("uploaded");

    assert_eq!(images.len(), 3);
    assert!(images.iter().all(|image| image.url.ends_with(&image.id.to_string())));
}

#[rstest]
#[case::empty(0)]
#[case::too_many(11)]
#[tokio::test]
async fn batch_size_is_bounded(details: ProviderServiceDetails, #[case] count: usize) {
    let actor = provider();
    let repo = repo_with_offering(&actor.id, details);
    let mut storage = MockObjectStorage::new();
    storage.expect_upload().times(0);

    let error = service(repo, storage)
        .upload_images(&actor, ServiceType::Cleaning, vec![jpeg(); count])
        .await
        .expect_err("bad batch");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::gif(ImageUpload { content_type: "image/gif".to_owned(), data: STANDARD.encode(b"GIF89a") })]
#[case::not_base64(ImageUpload { content_type: "image/png".to_owned(), data: "%%%".to_owned() })]
#[tokio::test]
async fn batch_is_validated_before_uploading(
    details: ProviderServiceDetails,
    #[case] bad: ImageUpload,
) {
    let actor = provider();
    let repo = repo_with_offering(&actor.id, details);
    let mut storage = MockObjectStorage::new();
    storage.expect_upload().times(0);

    let error = service(repo, storage)
        .upload_images(&actor, ServiceType::Cleaning, vec![jpeg(), bad])
        .await
        .expect_err("invalid image");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn upload_requires_existing_offering() {
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_find().return_once(|_, _| Ok(None));

    let error = service(repo, MockObjectStorage::new())
        .upload_images(&provider(), ServiceType::Cleaning, vec![jpeg()])
        .await
        .expect_err("missing offering");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn storage_failure_aborts_batch(details: ProviderServiceDetails) {
    let actor = provider();
    let mut repo = repo_with_offering(&actor.id, details);
    repo.expect_insert_image().returning(|_| Ok(()));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_upload()
        .returning(|_, _, _| Err(ObjectStorageError::io("disk full")));

    let error = service(repo, storage)
        .upload_images(&actor, ServiceType::Cleaning, vec![jpeg(), jpeg()])
        .await
        .expect_err("storage down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn delete_image_removes_object_then_row() {
    let actor = provider();
    let image = ServiceImage {
        id: Uuid::new_v4(),
        user_id: actor.id.clone(),
        service_type: ServiceType::Cleaning,
        url: "https://cdn.invalid/x".to_owned(),
        created_at: fixture_timestamp(),
    };
    let image_id = image.id;
    let key = image.storage_key();
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_find_image()
        .with(eq(actor.id.clone()), eq(image_id))
        .return_once(move |_, _| Ok(Some(image)));
    repo.expect_delete_image().times(1).return_once(|_, _| Ok(true));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete()
        .withf(move |candidate| candidate == key)
        .times(1)
        .return_once(|_| Ok(()));

    service(repo, storage)
        .delete_image(&actor, image_id)
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn deleting_someone_elses_image_is_not_found() {
    let mut repo = MockProviderServiceRepository::new();
    repo.expect_find_image().return_once(|_, _| Ok(None));
    let mut storage = MockObjectStorage::new();
    storage.expect_delete().times(0);

    let error = service(repo, storage)
        .delete_image(&provider(), Uuid::new_v4())
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

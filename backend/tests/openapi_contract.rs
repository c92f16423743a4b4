//! Contract checks over the generated OpenAPI document.

use std::collections::BTreeSet;

use marketplace::ApiDoc;
use rstest::{fixture, rstest};
use utoipa::OpenApi;
use utoipa::openapi::path::{Operation, PathItem};

#[fixture]
fn document() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

fn operations(item: &PathItem) -> impl Iterator<Item = &Operation> {
    [
        item.get.as_ref(),
        item.post.as_ref(),
        item.put.as_ref(),
        item.patch.as_ref(),
        item.delete.as_ref(),
    ]
    .into_iter()
    .flatten()
}

fn api_operations(doc: &utoipa::openapi::OpenApi) -> Vec<(&str, &Operation)> {
    doc.paths
        .paths
        .iter()
        .filter(|(path, _)| path.starts_with("/api/v1/"))
        .flat_map(|(path, item)| operations(item).map(move |op| (path.as_str(), op)))
        .collect()
}

#[rstest]
fn every_api_operation_requires_a_bearer_token(document: utoipa::openapi::OpenApi) {
    let operations = api_operations(&document);
    assert_eq!(operations.len(), 39);

    for (path, operation) in operations {
        let security = operation.security.as_ref();
        assert!(
            security.is_some_and(|requirements| !requirements.is_empty()),
            "{path} is missing a security requirement"
        );
        assert!(
            operation.responses.responses.contains_key("401"),
            "{path} does not document 401"
        );
    }
}

#[rstest]
fn operation_ids_are_unique(document: utoipa::openapi::OpenApi) {
    let mut seen = BTreeSet::new();
    for (path, operation) in api_operations(&document) {
        let id = operation
            .operation_id
            .clone()
            .unwrap_or_else(|| panic!("{path} has no operation id"));
        assert!(seen.insert(id.clone()), "duplicate operation id {id}");
    }
}

#[rstest]
#[case::create_booking("/api/v1/bookings")]
#[case::accept("/api/v1/bookings/{id}/accept")]
#[case::reject("/api/v1/bookings/{id}/reject")]
#[case::verify("/api/v1/payments/verify")]
#[case::wallet("/api/v1/wallet")]
#[case::read_all("/api/v1/notifications/read")]
#[case::images("/api/v1/services/{serviceType}/images")]
#[case::commission("/api/v1/service-pricing/commission")]
#[case::own_profile("/api/v1/users/profile")]
#[case::service_role("/api/v1/users/service-role")]
fn documented_paths_include(document: utoipa::openapi::OpenApi, #[case] path: &str) {
    assert!(
        document.paths.paths.contains_key(path),
        "{path} missing from {:?}",
        document.paths.paths.keys().collect::<Vec<_>>()
    );
}

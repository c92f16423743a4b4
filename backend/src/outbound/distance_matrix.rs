//! Google Distance Matrix adapter for the `DistanceEstimator` port.
//!
//! One origin and one destination per call. Both the top-level status and
//! the single element status must be `OK`; anything else is a rejection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::ports::{DistanceEstimator, DistanceEstimatorError, TravelEstimate};
use crate::outbound::http_support::body_preview;
use crate::outbound::retry::{RetryPolicy, retry};

/// Production endpoint for JSON responses.
pub const DEFAULT_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct MatrixResponseDto {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRowDto>,
}

#[derive(Debug, Deserialize)]
struct MatrixRowDto {
    #[serde(default)]
    elements: Vec<MatrixElementDto>,
}

#[derive(Debug, Deserialize)]
struct MatrixElementDto {
    status: String,
    distance: Option<TextValueDto>,
    duration: Option<TextValueDto>,
}

#[derive(Debug, Deserialize)]
struct TextValueDto {
    text: String,
}

impl MatrixResponseDto {
    fn into_estimate(self) -> Result<TravelEstimate, DistanceEstimatorError> {
        if self.status != STATUS_OK {
            let detail = self.error_message.unwrap_or_default();
            return Err(DistanceEstimatorError::rejected(format!(
                "{} {detail}",
                self.status
            )));
        }
        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or_else(|| DistanceEstimatorError::decode("response has no elements"))?;
        if element.status != STATUS_OK {
            return Err(DistanceEstimatorError::rejected(format!(
                "element status {}",
                element.status
            )));
        }
        match (element.distance, element.duration) {
            (Some(distance), Some(duration)) => Ok(TravelEstimate {
                distance: distance.text,
                duration: duration.text,
            }),
            _ => Err(DistanceEstimatorError::decode(
                "element is missing distance or duration",
            )),
        }
    }
}

/// Distance Matrix client authenticating with an API key.
pub struct GoogleDistanceMatrix {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
    retry_policy: RetryPolicy,
}

impl GoogleDistanceMatrix {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: Zeroizing<String>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            retry_policy,
        })
    }

    async fn fetch_once(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<TravelEstimate, DistanceEstimatorError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("language", "en"),
                ("key", self.api_key.as_str()),
                ("origins", origin),
                ("destinations", destination),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_estimate(body.as_ref())
    }
}

fn parse_estimate(body: &[u8]) -> Result<TravelEstimate, DistanceEstimatorError> {
    let decoded: MatrixResponseDto = serde_json::from_slice(body).map_err(|err| {
        DistanceEstimatorError::decode(format!("invalid distance matrix JSON: {err}"))
    })?;
    decoded.into_estimate()
}

fn map_transport_error(error: reqwest::Error) -> DistanceEstimatorError {
    // The request URL carries the API key.
    let error = error.without_url();
    if error.is_timeout() {
        DistanceEstimatorError::timeout(error.to_string())
    } else {
        DistanceEstimatorError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DistanceEstimatorError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    if status.is_server_error() {
        DistanceEstimatorError::transport(message)
    } else {
        DistanceEstimatorError::rejected(message)
    }
}

fn is_retryable(error: &DistanceEstimatorError) -> bool {
    matches!(
        error,
        DistanceEstimatorError::Transport { .. } | DistanceEstimatorError::Timeout { .. }
    )
}

#[async_trait]
impl DistanceEstimator for GoogleDistanceMatrix {
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<TravelEstimate, DistanceEstimatorError> {
        retry(
            &self.retry_policy,
            "distance_matrix.estimate",
            move || self.fetch_once(origin, destination),
            is_retryable,
        )
        .await
    }
}

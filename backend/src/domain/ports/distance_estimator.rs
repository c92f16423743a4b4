//! Driven port for road distance and travel time between two addresses.
//!
//! Matching treats every failure as "unknown", so adapters only need to
//! classify errors for logging.

use async_trait::async_trait;

use super::define_port_error;

/// Human-readable distance and duration, as rendered by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelEstimate {
    pub distance: String,
    pub duration: String,
}

define_port_error! {
    /// Errors surfaced while estimating travel.
    pub enum DistanceEstimatorError {
        /// Network transport failed before receiving a response.
        Transport => "distance transport failed: {message}",
        /// The estimator did not answer in time.
        Timeout => "distance timeout: {message}",
        /// The estimator refused the request or found no route.
        Rejected => "distance request rejected: {message}",
        /// The response could not be decoded.
        Decode => "distance response decode failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DistanceEstimator: Send + Sync {
    /// Estimate travel from `origin` to `destination`.
    async fn estimate(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<TravelEstimate, DistanceEstimatorError>;
}

/// Fixture estimator that never knows the route.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDistanceEstimator;

#[async_trait]
impl DistanceEstimator for FixtureDistanceEstimator {
    async fn estimate(
        &self,
        _origin: &str,
        _destination: &str,
    ) -> Result<TravelEstimate, DistanceEstimatorError> {
        Err(DistanceEstimatorError::rejected("fixture estimator has no routes"))
    }
}

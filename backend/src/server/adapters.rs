//! Outbound adapters selected from settings.
//!
//! A missing Paystack or Google Maps key falls back to the fixture adapter
//! for that port, so a developer can run the server without credentials.

use std::sync::Arc;

use color_eyre::eyre::{Context, Result};
use tracing::warn;

use marketplace::domain::ports::{
    DistanceEstimator, FixtureDistanceEstimator, FixtureObjectStorage, FixturePaymentGateway,
    ObjectStorage, PaymentGateway,
};
use marketplace::outbound::distance_matrix::GoogleDistanceMatrix;
use marketplace::outbound::local_storage::LocalObjectStorage;
use marketplace::outbound::paystack::PaystackHttpGateway;

use super::settings::AppSettings;

/// Driven ports that talk to something outside the database.
#[derive(Clone)]
pub struct OutboundAdapters {
    pub gateway: Arc<dyn PaymentGateway>,
    pub estimator: Arc<dyn DistanceEstimator>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Default for OutboundAdapters {
    fn default() -> Self {
        Self {
            gateway: Arc::new(FixturePaymentGateway),
            estimator: Arc::new(FixtureDistanceEstimator),
            storage: Arc::new(FixtureObjectStorage),
        }
    }
}

fn build_gateway(settings: &AppSettings) -> Result<Arc<dyn PaymentGateway>> {
    let Some(secret_key) = settings.paystack_secret_key() else {
        warn!("no Paystack secret key configured; using fixture payment gateway");
        return Ok(Arc::new(FixturePaymentGateway));
    };
    let gateway = PaystackHttpGateway::new(
        settings.paystack_base_url()?,
        secret_key,
        settings.http_timeout(),
        settings.retry_policy(),
    )
    .wrap_err("failed to build Paystack client")?;
    Ok(Arc::new(gateway))
}

fn build_estimator(settings: &AppSettings) -> Result<Arc<dyn DistanceEstimator>> {
    let Some(api_key) = settings.google_maps_api_key() else {
        warn!("no Google Maps API key configured; using fixture distance estimator");
        return Ok(Arc::new(FixtureDistanceEstimator));
    };
    let estimator = GoogleDistanceMatrix::new(
        settings.distance_matrix_url()?,
        api_key,
        settings.http_timeout(),
        settings.retry_policy(),
    )
    .wrap_err("failed to build Distance Matrix client")?;
    Ok(Arc::new(estimator))
}

fn build_storage(settings: &AppSettings) -> Result<Arc<dyn ObjectStorage>> {
    let root = settings.storage_root();
    let storage = LocalObjectStorage::open(&root, settings.storage_public_url()?)
        .with_context(|| format!("failed to open image storage at {}", root.display()))?;
    Ok(Arc::new(storage))
}

/// Build every outbound adapter named by `settings`.
///
/// # Errors
///
/// Fails when a configured URL is malformed, an HTTP client cannot be
/// built, or the storage root cannot be opened.
pub fn build_outbound_adapters(settings: &AppSettings) -> Result<OutboundAdapters> {
    Ok(OutboundAdapters {
        gateway: build_gateway(settings)?,
        estimator: build_estimator(settings)?,
        storage: build_storage(settings)?,
    })
}

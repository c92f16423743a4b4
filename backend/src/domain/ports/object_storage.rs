//! Driven port for storing uploaded service images.

use async_trait::async_trait;

use crate::domain::ImageContentType;

use super::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// Reading or writing the backing store failed.
        Io => "object storage io failed: {message}",
        /// The key cannot be mapped onto the backing store.
        InvalidKey => "object storage key invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn upload(
        &self,
        key: &str,
        content_type: ImageContentType,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStorageError>;

    /// Remove the object stored under `key`. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<(), ObjectStorageError>;
}

/// Fixture storage that keeps nothing and returns `fixture://` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureObjectStorage;

#[async_trait]
impl ObjectStorage for FixtureObjectStorage {
    async fn upload(
        &self,
        key: &str,
        _content_type: ImageContentType,
        _bytes: Vec<u8>,
    ) -> Result<String, ObjectStorageError> {
        Ok(format!("fixture://{key}"))
    }

    async fn delete(&self, _key: &str) -> Result<(), ObjectStorageError> {
        Ok(())
    }
}

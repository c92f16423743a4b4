//! Filesystem-backed [`ObjectStorage`] rooted in one capability directory.
//!
//! Objects are written beneath the root with `cap_std`, so a key can never
//! escape it. Public URLs are the key joined onto a configured base URL.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use url::Url;

use crate::domain::ImageContentType;
use crate::domain::ports::{ObjectStorage, ObjectStorageError};

/// Stores objects as files under `root` and serves them from `public_base`.
pub struct LocalObjectStorage {
    root: Arc<Dir>,
    public_base: Url,
}

impl LocalObjectStorage {
    /// Open (creating if needed) the storage root.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or opened.
    pub fn open(root: &Path, public_base: Url) -> std::io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        let public_base = if public_base.path().ends_with('/') {
            public_base
        } else {
            let mut base = public_base;
            let path = format!("{}/", base.path());
            base.set_path(&path);
            base
        };
        Ok(Self {
            root: Arc::new(dir),
            public_base,
        })
    }

    fn public_url(&self, key: &str) -> Result<String, ObjectStorageError> {
        self.public_base
            .join(key)
            .map(String::from)
            .map_err(|err| ObjectStorageError::invalid_key(format!("{key}: {err}")))
    }
}

/// Relative path for `key`; only plain, non-empty segments are accepted.
fn key_path(key: &str) -> Result<PathBuf, ObjectStorageError> {
    let path = Path::new(key);
    let plain = !key.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !plain {
        return Err(ObjectStorageError::invalid_key(key));
    }
    Ok(path.to_path_buf())
}

fn map_io_error(key: &str, error: std::io::Error) -> ObjectStorageError {
    ObjectStorageError::io(format!("{key}: {error}"))
}

fn map_join_error(error: tokio::task::JoinError) -> ObjectStorageError {
    ObjectStorageError::io(format!("storage task failed: {error}"))
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: ImageContentType,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStorageError> {
        let path = key_path(key)?;
        let url = self.public_url(key)?;
        let root = Arc::clone(&self.root);
        let owned_key = key.to_owned();
        let size = bytes.len();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                root.create_dir_all(parent)
                    .map_err(|err| map_io_error(&owned_key, err))?;
            }
            root.write(&path, bytes)
                .map_err(|err| map_io_error(&owned_key, err))
        })
        .await
        .map_err(map_join_error)??;
        debug!(%key, content_type = content_type.as_mime(), size, "object stored");
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStorageError> {
        let path = key_path(key)?;
        let root = Arc::clone(&self.root);
        let owned_key = key.to_owned();
        tokio::task::spawn_blocking(move || match root.remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(map_io_error(&owned_key, err)),
        })
        .await
        .map_err(map_join_error)?
    }
}

//! Filesystem-backed photo storage.

use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::fs;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{PhotoStorage, StorageError};
use crate::models::PhotoRef;

/// Writes photos into a directory, one file per upload.
///
/// Stored names are `{uuid}-{filename}` so two uploads of `front.jpg` never
/// overwrite each other.
#[derive(Debug, Clone)]
pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn stored_name(filename: &str) -> String {
        let id = Uuid::new_v4();
        if filename.is_empty() {
            id.to_string()
        } else {
            format!("{id}-{filename}")
        }
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn store(&self, filename: &str, data: Bytes) -> Result<PhotoRef, StorageError> {
        fs::create_dir_all(&self.root).await?;

        let name = Self::stored_name(filename);
        fs::write(self.root.join(&name), &data).await?;

        info!(photo = %name, "Stored shop photo");
        Ok(PhotoRef::new(name))
    }

    #[instrument(skip(self))]
    async fn discard(&self, photo: &PhotoRef) -> Result<(), StorageError> {
        match fs::remove_file(self.root.join(photo.as_str())).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(photo = %photo.as_str(), "Photo already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("coffeeshop-photos-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_store_then_discard() {
        let root = scratch_dir();
        let storage = LocalPhotoStorage::new(&root);

        let photo = storage
            .store("front.jpg", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();
        assert!(photo.as_str().ends_with("-front.jpg"));
        assert_eq!(fs::read(root.join(photo.as_str())).await.unwrap(), b"jpeg");

        storage.discard(&photo).await.unwrap();
        assert!(!root.join(photo.as_str()).exists());
        // Discarding twice is not an error.
        storage.discard(&photo).await.unwrap();

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_same_filename_twice_does_not_collide() {
        let root = scratch_dir();
        let storage = LocalPhotoStorage::new(&root);

        let a = storage.store("x.png", Bytes::from_static(b"a")).await.unwrap();
        let b = storage.store("x.png", Bytes::from_static(b"b")).await.unwrap();
        assert_ne!(a, b);

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[test]
    fn test_empty_filename_gets_bare_uuid() {
        let name = LocalPhotoStorage::stored_name("");
        assert!(Uuid::parse_str(&name).is_ok());
    }
}

//! In-memory photo storage used by the test suites.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::Mutex;

use super::{PhotoStorage, StorageError};
use crate::models::PhotoRef;

/// Keeps photos in a map. Can be switched into a failing mode to exercise
/// storage outages.
#[derive(Default)]
pub struct MemoryPhotoStorage {
    photos: Mutex<BTreeMap<String, Bytes>>,
    counter: AtomicU32,
    failing: AtomicBool,
}

impl MemoryPhotoStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `store` call fail.
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Names of the photos currently held.
    pub async fn names(&self) -> Vec<String> {
        self.photos.lock().await.keys().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<Bytes> {
        self.photos.lock().await.get(name).cloned()
    }
}

#[async_trait]
impl PhotoStorage for MemoryPhotoStorage {
    async fn store(&self, filename: &str, data: Bytes) -> Result<PhotoRef, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_owned()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("{n}-{filename}");
        self.photos.lock().await.insert(name.clone(), data);
        Ok(PhotoRef::new(name))
    }

    async fn discard(&self, photo: &PhotoRef) -> Result<(), StorageError> {
        self.photos.lock().await.remove(photo.as_str());
        Ok(())
    }
}

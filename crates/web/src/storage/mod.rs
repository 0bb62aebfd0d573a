//! Photo storage for shop listings.
//!
//! The shop service only sees the [`PhotoStorage`] trait object held by
//! [`AppState`](crate::state::AppState). Photos are written by
//! [`LocalPhotoStorage`] in production and served under `/uploads`.

mod filename;
mod local;
mod memory;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

use crate::models::PhotoRef;

pub use filename::secure_filename;
pub use local::LocalPhotoStorage;
pub use memory::MemoryPhotoStorage;

/// Errors raised by a photo storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("photo storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("photo storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for uploaded photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store a photo and return the reference to save on the shop.
    ///
    /// `filename` has already been through [`secure_filename`].
    async fn store(&self, filename: &str, data: Bytes) -> Result<PhotoRef, StorageError>;

    /// Remove a photo that was stored but never attached to a shop.
    async fn discard(&self, photo: &PhotoRef) -> Result<(), StorageError>;
}

//! Object store backends for archived observations.
//!
//! A store is bound to a single container (bucket). Operations return
//! [`StorageError`] and never panic; deciding whether a failure is fatal is
//! left to the caller.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::StorageError;

pub mod memory;
pub mod s3;

pub use memory::MemoryStore;
pub use s3::S3Store;

#[async_trait]
pub trait ArchiveStore: Send + Sync + Debug {
    /// Name of the container this store writes to.
    fn container(&self) -> &str;

    async fn container_exists(&self) -> Result<bool, StorageError>;

    async fn create_container(&self) -> Result<(), StorageError>;

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

#[async_trait]
impl<T: ArchiveStore + ?Sized> ArchiveStore for Box<T> {
    fn container(&self) -> &str {
        (**self).container()
    }

    async fn container_exists(&self) -> Result<bool, StorageError> {
        (**self).container_exists().await
    }

    async fn create_container(&self) -> Result<(), StorageError> {
        (**self).create_container().await
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        (**self).put_object(key, body, content_type).await
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        (**self).get_object(key).await
    }
}

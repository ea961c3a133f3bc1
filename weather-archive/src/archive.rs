use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::{ArchiveRecord, StorageError, WeatherObservation, store::ArchiveStore};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Outcome of [`ArchiveWriter::ensure_container_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Existing,
    Created,
    /// Neither found nor created; writes will most likely fail.
    Unavailable,
}

/// Writes observations to an object store as timestamped JSON records.
///
/// Two writes for the same city within the same second share a key, and the
/// later one replaces the earlier.
#[derive(Debug)]
pub struct ArchiveWriter<S> {
    store: S,
}

impl<S: ArchiveStore> ArchiveWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Best-effort: a failed existence check still falls through to creation,
    /// and no failure is returned to the caller.
    pub async fn ensure_container_exists(&self) -> ContainerStatus {
        let bucket = self.store.container();

        match self.store.container_exists().await {
            Ok(true) => {
                info!(bucket, "bucket exists");
                return ContainerStatus::Existing;
            }
            Ok(false) => info!(bucket, "creating bucket"),
            Err(err) => warn!(bucket, error = %err, "bucket check failed, attempting creation"),
        }

        match self.store.create_container().await {
            Ok(()) => {
                info!(bucket, "created bucket");
                ContainerStatus::Created
            }
            Err(err) => {
                error!(bucket, error = %err, "error creating bucket");
                ContainerStatus::Unavailable
            }
        }
    }

    /// Persist `observation` stamped with the current time. Returns the key.
    pub async fn persist(&self, observation: &WeatherObservation) -> Result<String, StorageError> {
        self.persist_at(observation, Utc::now()).await
    }

    pub async fn persist_at(
        &self,
        observation: &WeatherObservation,
        at: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let record = ArchiveRecord::new(observation.clone(), at);
        let key = record.key();
        let city = observation.city();

        let body = match serde_json::to_vec(&record) {
            Ok(body) => body,
            Err(err) => {
                error!(city, key = %key, error = %err, "error encoding archive record");
                return Err(err.into());
            }
        };

        match self.store.put_object(&key, body, CONTENT_TYPE_JSON).await {
            Ok(()) => {
                info!(city, key = %key, "saved weather data");
                Ok(key)
            }
            Err(err) => {
                error!(city, key = %key, error = %err, "error saving weather data");
                Err(err)
            }
        }
    }

    /// Read back a record written by [`persist`](Self::persist).
    pub async fn load(&self, key: &str) -> Result<ArchiveRecord, StorageError> {
        let body = self.store.get_object(key).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

//! Core library for the `weather-dashboard` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the [`WeatherSource`] trait
//! - Archiving of observations to an object store
//! - Batch fetching of a city list
//!
//! It is used by `weather-dashboard`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod archive;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod store;

pub use aggregate::{ArchiveSummary, Batch, archive_batch, fetch_batch, fetch_many, parse_city_list};
pub use archive::{ArchiveWriter, ContainerStatus};
pub use config::Config;
pub use error::{FailureKind, FetchError, StorageError};
pub use model::{ArchiveRecord, DashboardRow, WeatherObservation};
pub use provider::{OpenWeatherClient, WeatherSource};
pub use store::{ArchiveStore, MemoryStore, S3Store};

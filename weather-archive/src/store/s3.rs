use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::Region,
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};

use crate::{Config, StorageError};

use super::ArchiveStore;

/// Region in which buckets are created without a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// S3 (or S3-compatible) bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }

    /// Build a client from the AWS default credential chain, applying the
    /// region and endpoint overrides in `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let bucket = config.bucket()?.to_string();

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.s3_endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::new(Client::from_conf(s3_config.build()), bucket))
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        let region = self.client.config().region()?.to_string();
        if region == DEFAULT_REGION {
            return None;
        }

        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region.as_str()))
                .build(),
        )
    }
}

#[async_trait]
impl ArchiveStore for S3Store {
    fn container(&self) -> &str {
        &self.bucket
    }

    async fn container_exists(&self) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(StorageError::ContainerCheck {
                bucket: self.bucket.clone(),
                message: DisplayErrorContext(&err).to_string(),
            }),
        }
    }

    async fn create_container(&self) -> Result<(), StorageError> {
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .set_create_bucket_configuration(self.location_constraint())
            .send()
            .await
            .map_err(|err| StorageError::ContainerCreate {
                bucket: self.bucket.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| StorageError::Write {
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(StorageError::NotFound { key: key.to_string() });
            }
            Err(err) => {
                return Err(StorageError::Read {
                    key: key.to_string(),
                    message: DisplayErrorContext(&err).to_string(),
                });
            }
        };

        let data = output.body.collect().await.map_err(|err| StorageError::Read {
            key: key.to_string(),
            message: err.to_string(),
        })?;

        Ok(data.into_bytes().to_vec())
    }
}

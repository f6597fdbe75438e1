//! Amazon S3 (and S3-compatible) object store.

use super::{ObjectMetadata, ObjectStore, StoreError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, info, instrument};

/// Connection overrides on top of the standard AWS environment
/// (credentials, `AWS_REGION`, profiles).
#[derive(Debug, Clone, Default)]
pub struct S3StoreConfig {
    /// Custom endpoint URL (MinIO, LocalStack, …).
    pub endpoint_url: Option<String>,
    /// Force path-style addressing (required by MinIO).
    pub force_path_style: bool,
}

pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    /// Build a client from the ambient AWS configuration.
    pub async fn new(config: &S3StoreConfig) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(ref endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        info!(
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            path_style = config.force_path_style,
            "S3 store initialised"
        );

        Self::from_client(S3Client::from_conf(builder.build()))
    }

    pub fn from_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    StoreError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else if service_err.code() == Some("AccessDenied") {
                    StoreError::AccessDenied {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: service_err.to_string(),
                    }
                } else {
                    StoreError::Backend {
                        message: DisplayErrorContext(&service_err).to_string(),
                    }
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("failed to read body of s3://{bucket}/{key}: {e}"),
            })?
            .into_bytes()
            .to_vec();

        debug!(size_bytes = data.len(), "Downloaded object");
        Ok(data)
    }

    #[instrument(skip(self, data, metadata), fields(size_bytes = data.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .set_metadata(Some(metadata.clone()))
            .send()
            .await
            .map_err(|err| {
                let service_err = err.into_service_error();
                if service_err.code() == Some("AccessDenied") {
                    StoreError::AccessDenied {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: service_err.to_string(),
                    }
                } else {
                    StoreError::Backend {
                        message: DisplayErrorContext(&service_err).to_string(),
                    }
                }
            })?;

        debug!("Uploaded object");
        Ok(())
    }
}

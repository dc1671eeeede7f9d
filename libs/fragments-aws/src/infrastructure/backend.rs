//! Durable two-tier backend
//!
//! Composes the DynamoDB metadata store and the S3 payload store into one
//! implementation of the domain's `StorageBackend` port.

use std::future::Future;

use aws_config::SdkConfig;
use fragments_domain::{Fragment, FragmentId, FragmentListing, OwnerId, Result, StorageBackend};
use tracing::{instrument, Instrument};

use super::{DynamoMetadataStore, S3PayloadStore};

/// Settings for [`AwsBackend::from_sdk_config`]
#[derive(Debug, Clone)]
pub struct AwsBackendConfig {
    /// DynamoDB table holding fragment metadata
    pub table: String,
    /// S3 bucket holding fragment payloads
    pub bucket: String,
    /// Use path-style S3 addressing (required for MinIO and LocalStack)
    pub force_path_style: bool,
}

/// DynamoDB + S3 implementation of the StorageBackend port
#[derive(Clone, Debug)]
pub struct AwsBackend {
    metadata: DynamoMetadataStore,
    payloads: S3PayloadStore,
}

impl AwsBackend {
    pub fn new(metadata: DynamoMetadataStore, payloads: S3PayloadStore) -> Self {
        Self { metadata, payloads }
    }

    /// Build both clients from a loaded AWS SDK configuration
    ///
    /// ```rust,no_run
    /// use fragments_aws::infrastructure::{AwsBackend, AwsBackendConfig};
    ///
    /// # async fn example() {
    /// let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    /// let backend = AwsBackend::from_sdk_config(
    ///     &sdk_config,
    ///     AwsBackendConfig {
    ///         table: "fragments".to_string(),
    ///         bucket: "fragments".to_string(),
    ///         force_path_style: false,
    ///     },
    /// );
    /// # }
    /// ```
    pub fn from_sdk_config(sdk_config: &SdkConfig, config: AwsBackendConfig) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
        let dynamo_client = aws_sdk_dynamodb::Client::new(sdk_config);

        Self::new(
            DynamoMetadataStore::new(dynamo_client, config.table),
            S3PayloadStore::new(s3_client, config.bucket),
        )
    }

    pub fn metadata(&self) -> &DynamoMetadataStore {
        &self.metadata
    }

    pub fn payloads(&self) -> &S3PayloadStore {
        &self.payloads
    }
}

impl StorageBackend for AwsBackend {
    #[instrument(skip(self, fragment), fields(owner_id = %fragment.owner_id(), fragment_id = %fragment.id()))]
    fn put_metadata(&self, fragment: &Fragment) -> impl Future<Output = Result<()>> + Send {
        self.metadata.put(fragment).in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Fragment>> + Send {
        self.metadata.get(owner_id, id).in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    fn list_metadata(
        &self,
        owner_id: &OwnerId,
        expand: bool,
    ) -> impl Future<Output = Result<FragmentListing>> + Send {
        self.metadata.list(owner_id, expand).in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn delete_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        self.metadata.delete(owner_id, id).in_current_span()
    }

    #[instrument(skip(self, data), fields(owner_id = %owner_id, fragment_id = %id, data_size = data.len()))]
    fn put_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send {
        self.payloads.put(owner_id, id, data).in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn get_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.payloads.get(owner_id, id).in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn delete_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        self.payloads.delete(owner_id, id).in_current_span()
    }
}

//! S3 payload store
//!
//! Fragment bytes live in one bucket under `{owner_id}/{fragment_id}`. AWS
//! errors are converted to domain errors here and never leave this module.

use aws_sdk_s3::{
    error::DisplayErrorContext, operation::get_object::GetObjectError, primitives::ByteStream,
    Client,
};
use bytes::Bytes;
use fragments_domain::{FragmentError, FragmentId, OwnerId, Result};
use tracing::{debug, error, info, warn};

/// Payload tier of the durable backend
///
/// ## Error Handling
///
/// A missing object (`NoSuchKey`) becomes `FragmentError::NotFound`; every
/// other SDK failure becomes `FragmentError::Backend` with the full error
/// context for debugging.
#[derive(Clone, Debug)]
pub struct S3PayloadStore {
    client: Client,
    bucket: String,
}

impl S3PayloadStore {
    /// Create a new S3 payload store
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use fragments_aws::infrastructure::S3PayloadStore;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    /// let s3_client = Client::new(&config);
    /// let store = S3PayloadStore::new(s3_client, "fragments".to_string());
    /// # }
    /// ```
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3PayloadStore");
        Self { client, bucket }
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for a fragment's payload
    pub fn object_key(owner_id: &OwnerId, id: &FragmentId) -> String {
        format!("{}/{}", owner_id, id)
    }

    pub async fn put(&self, owner_id: &OwnerId, id: &FragmentId, data: &[u8]) -> Result<()> {
        let key = Self::object_key(owner_id, id);
        debug!(key = %key, bucket = %self.bucket, "Uploading fragment payload to S3");

        let body = ByteStream::from(Bytes::copy_from_slice(data));
        match self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .send()
            .await
        {
            Ok(_) => {
                info!(key = %key, size = data.len(), "Uploaded fragment payload to S3");
                Ok(())
            }
            Err(err) => {
                error!(key = %key, error = %DisplayErrorContext(&err), "Failed to upload fragment payload");
                Err(FragmentError::backend(format!(
                    "S3 put_object failed for key '{}': {}",
                    key,
                    DisplayErrorContext(&err)
                )))
            }
        }
    }

    /// Read the whole object, collecting the streamed body into one buffer
    pub async fn get(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Vec<u8>> {
        let key = Self::object_key(owner_id, id);
        debug!(key = %key, bucket = %self.bucket, "Reading fragment payload from S3");

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if matches!(err.as_service_error(), Some(GetObjectError::NoSuchKey(_))) => {
                warn!(key = %key, "Fragment payload does not exist in S3");
                return Err(FragmentError::not_found(format!("payload '{}'", key)));
            }
            Err(err) => {
                error!(key = %key, error = %DisplayErrorContext(&err), "Failed to read fragment payload");
                return Err(FragmentError::backend(format!(
                    "S3 get_object failed for key '{}': {}",
                    key,
                    DisplayErrorContext(&err)
                )));
            }
        };

        match output.body.collect().await {
            Ok(data) => {
                let bytes = data.into_bytes().to_vec();
                info!(key = %key, size = bytes.len(), "Read fragment payload from S3");
                Ok(bytes)
            }
            Err(err) => {
                error!(key = %key, error = ?err, "Failed to read S3 object body");
                Err(FragmentError::backend(format!(
                    "Failed to read S3 object body for key '{}': {}",
                    key, err
                )))
            }
        }
    }

    /// Delete the object; S3 treats a missing key as success
    pub async fn delete(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        let key = Self::object_key(owner_id, id);
        debug!(key = %key, bucket = %self.bucket, "Deleting fragment payload from S3");

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => {
                info!(key = %key, "Deleted fragment payload from S3");
                Ok(())
            }
            Err(err) => {
                error!(key = %key, error = %DisplayErrorContext(&err), "Failed to delete fragment payload");
                Err(FragmentError::backend(format!(
                    "S3 delete_object failed for key '{}': {}",
                    key,
                    DisplayErrorContext(&err)
                )))
            }
        }
    }
}

//! AWS adapters for the fragment storage port

mod backend;
mod dynamo_metadata_store;
mod s3_payload_store;

pub use backend::{AwsBackend, AwsBackendConfig};
pub use dynamo_metadata_store::DynamoMetadataStore;
pub use s3_payload_store::S3PayloadStore;

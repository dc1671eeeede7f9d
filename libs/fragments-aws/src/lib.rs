//! # Fragments AWS Adapter
//!
//! Durable implementation of the `StorageBackend` port from
//! `fragments-domain`: fragment metadata goes to a DynamoDB table, fragment
//! bytes go to an S3 bucket. Both tiers are keyed by `(owner_id, fragment_id)`.

pub mod infrastructure;

pub use infrastructure::{AwsBackend, AwsBackendConfig, DynamoMetadataStore, S3PayloadStore};

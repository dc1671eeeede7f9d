//! Ports (trait definitions) for fragment persistence
//!
//! The domain defines what it needs from storage; adapters provide it. A
//! backend is two stores behind one trait: a metadata table keyed by
//! `(owner_id, id)` that can also be listed per owner, and a byte store keyed
//! by the same pair. The two are written separately and nothing here makes
//! them transactional.
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait` so the service is monomorphized over its backend.

use std::future::Future;

use crate::fragment::{Fragment, FragmentId, OwnerId, Result};

/// Result of listing an owner's fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentListing {
    /// Only the ids, when the listing is not expanded
    Ids(Vec<FragmentId>),
    /// Full metadata records
    Expanded(Vec<Fragment>),
}

impl FragmentListing {
    pub fn len(&self) -> usize {
        match self {
            FragmentListing::Ids(ids) => ids.len(),
            FragmentListing::Expanded(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids in listing order, whatever the shape
    pub fn ids(&self) -> Vec<FragmentId> {
        match self {
            FragmentListing::Ids(ids) => ids.clone(),
            FragmentListing::Expanded(fragments) => {
                fragments.iter().map(|f| f.id().clone()).collect()
            }
        }
    }
}

/// Port for fragment storage
///
/// Implementations must:
/// - Never drop a write silently; transport or storage failures become
///   `FragmentError::Backend`
/// - Report absent records and payloads as `FragmentError::NotFound`
/// - Treat deletes of absent keys as success, on both tiers
/// - Convert any infrastructure errors to domain errors
///
/// Listing order is not part of the contract.
pub trait StorageBackend: Send + Sync {
    /// Upsert the full metadata record keyed by `(owner_id, id)`
    ///
    /// # Errors
    ///
    /// Returns `FragmentError::Backend` if the write fails
    fn put_metadata(&self, fragment: &Fragment) -> impl Future<Output = Result<()>> + Send;

    /// Load one metadata record
    ///
    /// # Errors
    ///
    /// - `FragmentError::NotFound` if no record exists for the key
    /// - `FragmentError::Backend` if the read fails
    fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Fragment>> + Send;

    /// List an owner's fragments, as ids or full records
    ///
    /// An owner with no fragments yields an empty listing, not an error.
    fn list_metadata(
        &self,
        owner_id: &OwnerId,
        expand: bool,
    ) -> impl Future<Output = Result<FragmentListing>> + Send;

    /// Remove one metadata record; an absent record is not an error
    fn delete_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Store or overwrite the payload at `(owner_id, id)`
    ///
    /// The metadata record is not touched.
    ///
    /// # Errors
    ///
    /// Returns `FragmentError::Backend` if the write fails
    fn put_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read the whole payload into one buffer
    ///
    /// # Errors
    ///
    /// - `FragmentError::NotFound` if no payload exists for the key
    /// - `FragmentError::Backend` if the read fails
    fn get_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Remove a payload; an absent payload is not an error
    fn delete_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send;
}

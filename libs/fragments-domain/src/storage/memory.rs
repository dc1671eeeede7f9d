//! In-process storage backend
//!
//! Keeps metadata and payloads in two maps owned by the backend instance.
//! Nothing is durable: the data lives as long as the last clone of the
//! backend. Each test builds its own instance, so tests never share state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::{debug, instrument, Instrument};

use crate::fragment::{Fragment, FragmentError, FragmentId, OwnerId, Result};
use crate::storage::ports::{FragmentListing, StorageBackend};

type MetadataTable = HashMap<OwnerId, IndexMap<FragmentId, Fragment>>;
type PayloadTable = HashMap<(OwnerId, FragmentId), Vec<u8>>;

/// Map-backed implementation of the [`StorageBackend`] port
///
/// Clones share the same underlying maps. Every operation takes the lock of
/// the map it touches for its whole duration, so concurrent writers on the
/// same key are serialized. Listings come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    metadata: Arc<Mutex<MetadataTable>>,
    payloads: Arc<Mutex<PayloadTable>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn metadata(&self) -> Result<MutexGuard<'_, MetadataTable>> {
        self.metadata
            .lock()
            .map_err(|_| FragmentError::backend("in-memory metadata lock poisoned"))
    }

    fn payloads(&self) -> Result<MutexGuard<'_, PayloadTable>> {
        self.payloads
            .lock()
            .map_err(|_| FragmentError::backend("in-memory payload lock poisoned"))
    }

    fn payload_key(owner_id: &OwnerId, id: &FragmentId) -> (OwnerId, FragmentId) {
        (owner_id.clone(), id.clone())
    }
}

impl StorageBackend for InMemoryBackend {
    #[instrument(skip(self, fragment), fields(owner_id = %fragment.owner_id(), fragment_id = %fragment.id()))]
    fn put_metadata(&self, fragment: &Fragment) -> impl Future<Output = Result<()>> + Send {
        let fragment = fragment.clone();

        async move {
            debug!("Writing fragment metadata");
            self.metadata()?
                .entry(fragment.owner_id().clone())
                .or_default()
                .insert(fragment.id().clone(), fragment);
            Ok::<_, FragmentError>(())
        }
        .in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Fragment>> + Send {
        let owner_id = owner_id.clone();
        let id = id.clone();

        async move {
            let table = self.metadata()?;
            table
                .get(&owner_id)
                .and_then(|fragments| fragments.get(&id))
                .cloned()
                .ok_or_else(|| FragmentError::not_found(id.to_string()))
        }
        .in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id))]
    fn list_metadata(
        &self,
        owner_id: &OwnerId,
        expand: bool,
    ) -> impl Future<Output = Result<FragmentListing>> + Send {
        let owner_id = owner_id.clone();

        async move {
            let table = self.metadata()?;
            let fragments = table.get(&owner_id);

            let listing = if expand {
                FragmentListing::Expanded(
                    fragments.map(|f| f.values().cloned().collect()).unwrap_or_default(),
                )
            } else {
                FragmentListing::Ids(
                    fragments.map(|f| f.keys().cloned().collect()).unwrap_or_default(),
                )
            };
            debug!(count = listing.len(), "Listed fragment metadata");
            Ok::<_, FragmentError>(listing)
        }
        .in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn delete_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        let owner_id = owner_id.clone();
        let id = id.clone();

        async move {
            let mut table = self.metadata()?;
            if let Some(fragments) = table.get_mut(&owner_id) {
                fragments.shift_remove(&id);
                if fragments.is_empty() {
                    table.remove(&owner_id);
                }
            }
            Ok::<_, FragmentError>(())
        }
        .in_current_span()
    }

    #[instrument(skip(self, data), fields(owner_id = %owner_id, fragment_id = %id, data_size = data.len()))]
    fn put_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send {
        let key = Self::payload_key(owner_id, id);
        let data = data.to_vec();

        async move {
            self.payloads()?.insert(key, data);
            Ok::<_, FragmentError>(())
        }
        .in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn get_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let key = Self::payload_key(owner_id, id);

        async move {
            let table = self.payloads()?;
            table
                .get(&key)
                .cloned()
                .ok_or_else(|| FragmentError::not_found(format!("payload for {}", key.1)))
        }
        .in_current_span()
    }

    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    fn delete_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        let key = Self::payload_key(owner_id, id);

        async move {
            self.payloads()?.remove(&key);
            Ok::<_, FragmentError>(())
        }
        .in_current_span()
    }
}

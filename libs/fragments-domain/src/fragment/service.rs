//! Fragment service - Business logic orchestration
//!
//! The service is the surface the transport layer calls. It validates input
//! through the [`Fragment`] entity, persists through the storage port and
//! converts through the conversion engine.
//!
//! Writes touch two stores with no transaction: metadata first, payload
//! second. A failure in between leaves a record whose payload is missing;
//! reads report that state as `FragmentError::Backend` instead of inventing
//! empty data.

use tracing::{debug, info, instrument, warn};

use super::{
    ContentType, Fragment, FragmentError, FragmentId, FragmentView, MediaType, OwnerId, Result,
};
use crate::conversion;
use crate::storage::{FragmentListing, StorageBackend};

/// Configuration for the fragment service
#[derive(Debug, Clone)]
pub struct FragmentConfig {
    /// Maximum allowed payload size in bytes (default: 5MB)
    pub max_payload_size: usize,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// Fragment bytes together with the media type they are expressed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentPayload {
    pub data: Vec<u8>,
    /// The stored Content-Type, or the conversion target when one was requested
    pub content_type: String,
}

/// Service for storing and retrieving fragments
///
/// ## Static Dispatch
///
/// The service is generic over any `StorageBackend` implementation, which is
/// injected at construction and owned by the service.
pub struct FragmentService<B> {
    backend: B,
    config: FragmentConfig,
}

impl<B> FragmentService<B>
where
    B: StorageBackend,
{
    /// Create a new FragmentService with the given backend and configuration
    pub fn new(backend: B, config: FragmentConfig) -> Self {
        Self { backend, config }
    }

    /// Create a new FragmentService with default configuration
    pub fn with_backend(backend: B) -> Self {
        Self::new(backend, FragmentConfig::default())
    }

    /// Store a new fragment and return its metadata
    ///
    /// # Errors
    ///
    /// - `FragmentError::UnsupportedType` if `content_type` is not supported
    /// - `FragmentError::PayloadTooLarge` if `data` exceeds the configured maximum
    /// - `FragmentError::Backend` if either write fails. When the payload write
    ///   fails the metadata record stays behind without a payload.
    #[instrument(skip(self, data), fields(owner_id = %owner_id, data_size = data.len()))]
    pub async fn create(
        &self,
        owner_id: &OwnerId,
        content_type: &str,
        data: &[u8],
    ) -> Result<FragmentView> {
        self.check_size(data)?;

        let mut fragment = Fragment::new(owner_id.clone(), content_type)?;
        fragment.record_payload_write(data.len() as u64);

        self.backend.put_metadata(&fragment).await?;
        if let Err(err) = self.backend.put_payload(owner_id, fragment.id(), data).await {
            warn!(fragment_id = %fragment.id(), error = %err, "Payload write failed after metadata write");
            return Err(into_backend(err));
        }

        info!(fragment_id = %fragment.id(), "Created fragment");
        Ok(fragment.view())
    }

    /// Load a fragment's metadata
    ///
    /// A fragment owned by someone else is reported exactly like a missing one.
    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    pub async fn fetch(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<FragmentView> {
        Ok(self.backend.get_metadata(owner_id, id).await?.view())
    }

    /// Load a fragment's bytes, optionally converted to the type behind `extension`
    ///
    /// Without an extension the stored bytes and Content-Type come back as-is.
    ///
    /// # Errors
    ///
    /// - `FragmentError::UnsupportedExtension` if the extension is not mapped
    /// - `FragmentError::NotFound` if the fragment does not exist for the owner
    /// - `FragmentError::UnsupportedConversion` if the target is unreachable
    /// - `FragmentError::Backend` if the metadata exists but the payload does not
    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    pub async fn fetch_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        extension: Option<&str>,
    ) -> Result<FragmentPayload> {
        let target = extension
            .map(|ext| {
                Fragment::mime_type_for_extension(ext)
                    .ok_or_else(|| FragmentError::unsupported_extension(ext))
            })
            .transpose()?;

        let fragment = self.backend.get_metadata(owner_id, id).await?;
        if let Some(target) = target {
            if !conversion::can_convert(fragment.mime_type(), target) {
                return Err(FragmentError::UnsupportedConversion {
                    from: fragment.mime_type(),
                    to: target,
                });
            }
        }

        let data = self
            .backend
            .get_payload(owner_id, id)
            .await
            .map_err(into_backend)?;

        match target {
            Some(target) if target != fragment.mime_type() => {
                debug!(from = %fragment.mime_type(), to = %target, "Converting fragment");
                Ok(FragmentPayload {
                    data: fragment.convert(&data, target)?,
                    content_type: target.to_string(),
                })
            }
            _ => Ok(FragmentPayload {
                data,
                content_type: fragment.content_type().to_string(),
            }),
        }
    }

    /// List an owner's fragments as ids, or as full metadata when `expand` is set
    #[instrument(skip(self), fields(owner_id = %owner_id))]
    pub async fn list(&self, owner_id: &OwnerId, expand: bool) -> Result<FragmentListing> {
        self.backend.list_metadata(owner_id, expand).await
    }

    /// Replace a fragment's payload
    ///
    /// The base media type is locked at creation; parameters such as charset
    /// may differ. The stored Content-Type is kept as it was.
    ///
    /// # Errors
    ///
    /// - `FragmentError::UnsupportedType` if `content_type` is not supported
    /// - `FragmentError::PayloadTooLarge` if `data` exceeds the configured maximum
    /// - `FragmentError::NotFound` if the fragment does not exist for the owner
    /// - `FragmentError::TypeMismatch` if the base media type differs
    /// - `FragmentError::Backend` if either write fails
    #[instrument(skip(self, data), fields(owner_id = %owner_id, fragment_id = %id, data_size = data.len()))]
    pub async fn update(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        content_type: &str,
        data: &[u8],
    ) -> Result<FragmentView> {
        let requested = supported_media_type(content_type)?;
        self.check_size(data)?;

        let mut fragment = self.backend.get_metadata(owner_id, id).await?;
        if fragment.mime_type() != requested {
            return Err(FragmentError::TypeMismatch {
                existing: fragment.mime_type(),
                requested,
            });
        }

        fragment.record_payload_write(data.len() as u64);
        self.backend.put_metadata(&fragment).await?;
        self.backend
            .put_payload(owner_id, id, data)
            .await
            .map_err(into_backend)?;

        info!(size = fragment.size(), "Updated fragment");
        Ok(fragment.view())
    }

    /// Delete a fragment's payload, then its metadata
    ///
    /// Deleting the payload first keeps a retry possible: if the metadata
    /// delete fails the record is still found and the second attempt finishes
    /// the job. Partial failures are returned, never rolled back.
    #[instrument(skip(self), fields(owner_id = %owner_id, fragment_id = %id))]
    pub async fn delete(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        self.backend.get_metadata(owner_id, id).await?;

        self.backend.delete_payload(owner_id, id).await?;
        if let Err(err) = self.backend.delete_metadata(owner_id, id).await {
            warn!(error = %err, "Metadata delete failed after payload delete");
            return Err(into_backend(err));
        }

        info!("Deleted fragment");
        Ok(())
    }

    /// Get the service configuration
    pub fn config(&self) -> &FragmentConfig {
        &self.config
    }

    /// Get the storage backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn check_size(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.config.max_payload_size {
            return Err(FragmentError::payload_too_large(
                data.len(),
                self.config.max_payload_size,
            ));
        }
        Ok(())
    }
}

fn supported_media_type(content_type: &str) -> Result<MediaType> {
    ContentType::parse(content_type)?
        .media_type()
        .ok_or_else(|| FragmentError::unsupported_type(content_type))
}

/// A payload miss behind an existing metadata record is a storage fault
fn into_backend(err: FragmentError) -> FragmentError {
    match err {
        FragmentError::NotFound(msg) => {
            FragmentError::backend(format!("metadata exists but payload is missing: {msg}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBackend;

    fn owner(name: &str) -> OwnerId {
        OwnerId::parse(name).unwrap()
    }

    fn service() -> FragmentService<InMemoryBackend> {
        FragmentService::with_backend(InMemoryBackend::new())
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let service = service();
        let owner = owner("a");

        let created = service.create(&owner, "text/plain", b"hello").await.unwrap();
        let fetched = service.fetch(&owner, &created.id).await.unwrap();

        assert_eq!(fetched.content_type, "text/plain");
        assert_eq!(fetched.size, 5);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_fetch_payload_without_extension_is_verbatim() {
        let service = service();
        let owner = owner("a");
        let created = service
            .create(&owner, "text/plain; charset=utf-8", b"hello")
            .await
            .unwrap();

        let payload = service.fetch_payload(&owner, &created.id, None).await.unwrap();

        assert_eq!(payload.data, b"hello");
        assert_eq!(payload.content_type, "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_type() {
        let service = service();
        let result = service.create(&owner("a"), "application/msword", b"x").await;

        assert!(matches!(result, Err(FragmentError::UnsupportedType(_))));
        assert!(service.list(&owner("a"), false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_too_large_payload_fails() {
        let service = FragmentService::new(
            InMemoryBackend::new(),
            FragmentConfig {
                max_payload_size: 4,
            },
        );

        let result = service.create(&owner("a"), "text/plain", b"too long").await;

        assert!(matches!(
            result,
            Err(FragmentError::PayloadTooLarge { size: 8, max: 4 })
        ));
    }

    #[tokio::test]
    async fn test_unknown_extension() {
        let service = service();
        let owner = owner("a");
        let created = service.create(&owner, "text/plain", b"hi").await.unwrap();

        let result = service.fetch_payload(&owner, &created.id, Some(".exe")).await;

        assert!(matches!(result, Err(FragmentError::UnsupportedExtension(_))));
    }

    #[tokio::test]
    async fn test_same_type_extension_returns_stored_type() {
        let service = service();
        let owner = owner("a");
        let created = service
            .create(&owner, "text/markdown; charset=utf-8", b"# hi")
            .await
            .unwrap();

        let payload = service
            .fetch_payload(&owner, &created.id, Some(".md"))
            .await
            .unwrap();

        assert_eq!(payload.data, b"# hi");
        assert_eq!(payload.content_type, "text/markdown; charset=utf-8");
    }

    #[tokio::test]
    async fn test_update_replaces_payload() {
        let service = service();
        let owner = owner("a");
        let created = service.create(&owner, "text/plain", b"one").await.unwrap();

        let updated = service
            .update(&owner, &created.id, "text/plain; charset=ascii", b"three")
            .await
            .unwrap();

        assert_eq!(updated.size, 5);
        assert_eq!(updated.created, created.created);
        assert!(updated.updated >= created.updated);
        assert_eq!(updated.content_type, "text/plain");

        let payload = service.fetch_payload(&owner, &created.id, None).await.unwrap();
        assert_eq!(payload.data, b"three");
    }

    #[tokio::test]
    async fn test_update_type_lock() {
        let service = service();
        let owner = owner("a");
        let created = service.create(&owner, "text/plain", b"one").await.unwrap();

        let result = service
            .update(&owner, &created.id, "text/markdown", b"# two")
            .await;

        assert_eq!(
            result,
            Err(FragmentError::TypeMismatch {
                existing: MediaType::TextPlain,
                requested: MediaType::TextMarkdown,
            })
        );
    }

    #[tokio::test]
    async fn test_update_missing_fragment() {
        let service = service();
        let result = service
            .update(&owner("a"), &FragmentId::new(), "text/plain", b"x")
            .await;

        assert!(matches!(result, Err(FragmentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_then_fetch() {
        let service = service();
        let owner = owner("a");
        let created = service.create(&owner, "text/plain", b"bye").await.unwrap();

        service.delete(&owner, &created.id).await.unwrap();

        assert!(matches!(
            service.fetch(&owner, &created.id).await,
            Err(FragmentError::NotFound(_))
        ));
        assert!(matches!(
            service.backend().get_payload(&owner, &created.id).await,
            Err(FragmentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_fragment() {
        let service = service();
        let result = service.delete(&owner("a"), &FragmentId::new()).await;

        assert!(matches!(result, Err(FragmentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_metadata_without_payload_is_a_backend_error() {
        let service = service();
        let owner = owner("a");
        let created = service.create(&owner, "text/plain", b"hi").await.unwrap();
        service
            .backend()
            .delete_payload(&owner, &created.id)
            .await
            .unwrap();

        let result = service.fetch_payload(&owner, &created.id, None).await;

        assert!(matches!(result, Err(FragmentError::Backend(_))));
    }
}

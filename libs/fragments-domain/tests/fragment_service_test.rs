//! Integration tests for the fragment service
//!
//! These tests drive the public API end to end against the in-process
//! backend and verify that:
//! 1. Conversions requested by extension produce the expected bytes and type
//! 2. Owners never see each other's fragments
//! 3. Partial write and delete failures are surfaced, not hidden

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fragments_domain::{
    Fragment, FragmentError, FragmentId, FragmentListing, FragmentService, InMemoryBackend,
    OwnerId, Result, StorageBackend,
};
use serde_json::json;

fn owner(name: &str) -> OwnerId {
    OwnerId::parse(name).expect("valid owner id")
}

/// Backend that delegates to memory but can be told to fail specific writes
#[derive(Clone, Default)]
struct FaultyBackend {
    inner: InMemoryBackend,
    fail_put_payload: Arc<AtomicBool>,
    fail_delete_metadata: Arc<AtomicBool>,
}

impl StorageBackend for FaultyBackend {
    fn put_metadata(&self, fragment: &Fragment) -> impl Future<Output = Result<()>> + Send {
        self.inner.put_metadata(fragment)
    }

    fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Fragment>> + Send {
        self.inner.get_metadata(owner_id, id)
    }

    fn list_metadata(
        &self,
        owner_id: &OwnerId,
        expand: bool,
    ) -> impl Future<Output = Result<FragmentListing>> + Send {
        self.inner.list_metadata(owner_id, expand)
    }

    fn delete_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        let fail = self.fail_delete_metadata.load(Ordering::SeqCst);
        let delete = self.inner.delete_metadata(owner_id, id);
        async move {
            if fail {
                return Err(FragmentError::backend("metadata table unavailable"));
            }
            delete.await
        }
    }

    fn put_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send {
        let fail = self.fail_put_payload.load(Ordering::SeqCst);
        let put = self.inner.put_payload(owner_id, id, data);
        async move {
            if fail {
                return Err(FragmentError::backend("bucket unavailable"));
            }
            put.await
        }
    }

    fn get_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.inner.get_payload(owner_id, id)
    }

    fn delete_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        self.inner.delete_payload(owner_id, id)
    }
}

/// CSV fetched with `.json` becomes an array of row objects
#[tokio::test]
async fn test_csv_to_json_scenario() {
    let service = FragmentService::with_backend(InMemoryBackend::new());
    let owner = owner("user-1");

    let fragment = service
        .create(&owner, "text/csv", b"name,age\nJohn,25\nJane,30")
        .await
        .unwrap();
    let payload = service
        .fetch_payload(&owner, &fragment.id, Some(".json"))
        .await
        .unwrap();

    assert_eq!(payload.content_type, "application/json");
    let value: serde_json::Value = serde_json::from_slice(&payload.data).unwrap();
    assert_eq!(
        value,
        json!([{"name": "John", "age": "25"}, {"name": "Jane", "age": "30"}])
    );
}

/// Markdown fetched with `.html` is rendered
#[tokio::test]
async fn test_markdown_to_html_scenario() {
    let service = FragmentService::with_backend(InMemoryBackend::new());
    let owner = owner("user-1");

    let fragment = service
        .create(&owner, "text/markdown", b"# Hi\n**bold**")
        .await
        .unwrap();
    let payload = service
        .fetch_payload(&owner, &fragment.id, Some(".html"))
        .await
        .unwrap();

    let html = String::from_utf8(payload.data).unwrap();
    assert_eq!(payload.content_type, "text/html");
    assert!(html.contains("<h1>Hi</h1>"));
    assert!(html.contains("<strong>bold</strong>"));
}

/// JSON fetched with `.yaml` is flattened
#[tokio::test]
async fn test_json_to_yaml_scenario() {
    let service = FragmentService::with_backend(InMemoryBackend::new());
    let owner = owner("user-1");

    let fragment = service
        .create(&owner, "application/json", br#"{"name":"John"}"#)
        .await
        .unwrap();
    let payload = service
        .fetch_payload(&owner, &fragment.id, Some(".yml"))
        .await
        .unwrap();

    assert_eq!(payload.content_type, "application/yaml");
    assert_eq!(payload.data, b"name: John");
}

/// Plain text cannot be turned into JSON
#[tokio::test]
async fn test_plain_text_to_json_is_unsupported() {
    let service = FragmentService::with_backend(InMemoryBackend::new());
    let owner = owner("user-1");

    let fragment = service.create(&owner, "text/plain", b"hello").await.unwrap();
    let result = service
        .fetch_payload(&owner, &fragment.id, Some(".json"))
        .await;

    assert!(matches!(
        result,
        Err(FragmentError::UnsupportedConversion { .. })
    ));
}

/// Another owner's lookups behave as if the fragment did not exist
#[tokio::test]
async fn test_ownership_isolation() {
    let service = FragmentService::with_backend(InMemoryBackend::new());
    let (alice, bob) = (owner("alice"), owner("bob"));

    let fragment = service.create(&alice, "text/plain", b"secret").await.unwrap();

    assert!(matches!(
        service.fetch(&bob, &fragment.id).await,
        Err(FragmentError::NotFound(_))
    ));
    assert!(matches!(
        service.fetch_payload(&bob, &fragment.id, None).await,
        Err(FragmentError::NotFound(_))
    ));
    assert!(matches!(
        service.delete(&bob, &fragment.id).await,
        Err(FragmentError::NotFound(_))
    ));
    assert!(service.list(&bob, false).await.unwrap().is_empty());

    // Alice still has it
    assert!(service.fetch(&alice, &fragment.id).await.is_ok());
}

/// Listing returns ids or full records
#[tokio::test]
async fn test_list_ids_and_expanded() {
    let service = FragmentService::with_backend(InMemoryBackend::new());
    let owner = owner("user-1");

    let first = service.create(&owner, "text/plain", b"1").await.unwrap();
    let second = service.create(&owner, "application/json", b"{}").await.unwrap();

    let ids = service.list(&owner, false).await.unwrap();
    assert_eq!(ids.ids(), vec![first.id.clone(), second.id.clone()]);

    match service.list(&owner, true).await.unwrap() {
        FragmentListing::Expanded(fragments) => {
            let views: Vec<_> = fragments.iter().map(Fragment::view).collect();
            assert_eq!(views, vec![first, second]);
        }
        other => panic!("expected expanded listing, got {other:?}"),
    }
}

/// A failed payload write leaves metadata behind and reads report it
#[tokio::test]
async fn test_create_partial_failure_is_surfaced() {
    let backend = FaultyBackend::default();
    backend.fail_put_payload.store(true, Ordering::SeqCst);
    let service = FragmentService::with_backend(backend.clone());
    let owner = owner("user-1");

    let result = service.create(&owner, "text/plain", b"lost").await;
    assert!(matches!(result, Err(FragmentError::Backend(_))));

    // The orphaned metadata is still there; its payload is not
    let ids = service.list(&owner, false).await.unwrap().ids();
    assert_eq!(ids.len(), 1);
    assert!(matches!(
        service.fetch_payload(&owner, &ids[0], None).await,
        Err(FragmentError::Backend(_))
    ));
}

/// A failed metadata delete is reported and a retry completes the delete
#[tokio::test]
async fn test_delete_partial_failure_can_be_retried() {
    let backend = FaultyBackend::default();
    let service = FragmentService::with_backend(backend.clone());
    let owner = owner("user-1");
    let fragment = service.create(&owner, "text/plain", b"bye").await.unwrap();

    backend.fail_delete_metadata.store(true, Ordering::SeqCst);
    assert!(matches!(
        service.delete(&owner, &fragment.id).await,
        Err(FragmentError::Backend(_))
    ));
    assert!(service.fetch(&owner, &fragment.id).await.is_ok());

    backend.fail_delete_metadata.store(false, Ordering::SeqCst);
    service.delete(&owner, &fragment.id).await.unwrap();
    assert!(matches!(
        service.fetch(&owner, &fragment.id).await,
        Err(FragmentError::NotFound(_))
    ));
}

/// Separate owners writing concurrently do not interfere
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates() {
    let service = Arc::new(FragmentService::with_backend(InMemoryBackend::new()));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let owner = owner(&format!("owner-{}", i % 4));
                let data = format!("payload {i}");
                let fragment = service
                    .create(&owner, "text/plain", data.as_bytes())
                    .await
                    .unwrap();
                let payload = service.fetch_payload(&owner, &fragment.id, None).await.unwrap();
                assert_eq!(payload.data, data.as_bytes());
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    for i in 0..4 {
        let listing = service.list(&owner(&format!("owner-{i}")), false).await.unwrap();
        assert_eq!(listing.len(), 4);
    }
}

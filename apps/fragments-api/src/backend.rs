//! Runtime backend selection
//!
//! The service is generic over its backend; the binary picks one at start-up
//! from configuration, so the choice is wrapped in an enum that forwards
//! every port call.

use std::future::Future;

use fragments_aws::AwsBackend;
use fragments_domain::{
    Fragment, FragmentId, FragmentListing, InMemoryBackend, OwnerId, Result, StorageBackend,
};

#[derive(Clone, Debug)]
pub enum Backend {
    Memory(InMemoryBackend),
    Aws(AwsBackend),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Aws(_) => "aws",
        }
    }
}

impl StorageBackend for Backend {
    fn put_metadata(&self, fragment: &Fragment) -> impl Future<Output = Result<()>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.put_metadata(fragment).await,
                Backend::Aws(backend) => backend.put_metadata(fragment).await,
            }
        }
    }

    fn get_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Fragment>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.get_metadata(owner_id, id).await,
                Backend::Aws(backend) => backend.get_metadata(owner_id, id).await,
            }
        }
    }

    fn list_metadata(
        &self,
        owner_id: &OwnerId,
        expand: bool,
    ) -> impl Future<Output = Result<FragmentListing>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.list_metadata(owner_id, expand).await,
                Backend::Aws(backend) => backend.list_metadata(owner_id, expand).await,
            }
        }
    }

    fn delete_metadata(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.delete_metadata(owner_id, id).await,
                Backend::Aws(backend) => backend.delete_metadata(owner_id, id).await,
            }
        }
    }

    fn put_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: &[u8],
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.put_payload(owner_id, id, data).await,
                Backend::Aws(backend) => backend.put_payload(owner_id, id, data).await,
            }
        }
    }

    fn get_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.get_payload(owner_id, id).await,
                Backend::Aws(backend) => backend.get_payload(owner_id, id).await,
            }
        }
    }

    fn delete_payload(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            match self {
                Backend::Memory(backend) => backend.delete_payload(owner_id, id).await,
                Backend::Aws(backend) => backend.delete_payload(owner_id, id).await,
            }
        }
    }
}

//! # Fragments Domain Layer
//!
//! This crate contains the pure business logic of the Fragments service:
//! owned, typed byte payloads ("fragments") that can be read back verbatim
//! or converted into a compatible text representation. It follows hexagonal
//! architecture principles:
//!
//! - **Entities**: Core domain models (Fragment, MediaType)
//! - **Ports**: Trait definitions for external dependencies (StorageBackend)
//! - **Services**: Business logic orchestration (FragmentService)
//! - **Conversion**: The static media type compatibility table and its rules
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (AWS, HTTP, etc.).
//! Durable storage lives in an adapter crate implementing [`StorageBackend`];
//! [`InMemoryBackend`] is provided here for development and tests.
//!
//! ## Example
//!
//! ```rust
//! use fragments_domain::{FragmentService, InMemoryBackend, OwnerId};
//!
//! # async fn example() -> fragments_domain::Result<()> {
//! let service = FragmentService::with_backend(InMemoryBackend::new());
//! let owner = OwnerId::parse("user-1")?;
//!
//! let fragment = service.create(&owner, "text/csv", b"name,age\nJohn,25").await?;
//! let json = service.fetch_payload(&owner, &fragment.id, Some(".json")).await?;
//! assert_eq!(json.content_type, "application/json");
//! # Ok(())
//! # }
//! ```

pub mod conversion;
pub mod fragment;
pub mod storage;

// Re-export commonly used types
pub use fragment::{
    Fragment, FragmentConfig, FragmentError, FragmentId, FragmentPayload, FragmentService,
    FragmentView, MediaType, OwnerId, Result,
};
pub use storage::{FragmentListing, InMemoryBackend, StorageBackend};

//! Storage port and the in-process backend

mod memory;
mod ports;

pub use memory::InMemoryBackend;
pub use ports::{FragmentListing, StorageBackend};

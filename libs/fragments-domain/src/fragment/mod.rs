//! Fragment domain module
//!
//! This module contains the fragment entity, its identifiers and media types,
//! the domain error type and the service that orchestrates storage and
//! conversion.

mod entity;
mod error;
mod ids;
mod media;
mod service;

pub use entity::{Fragment, FragmentView, NewFragment};
pub use error::{FragmentError, Result};
pub use ids::{FragmentId, OwnerId};
pub use media::{ContentType, MediaType};
pub use service::{FragmentConfig, FragmentPayload, FragmentService};

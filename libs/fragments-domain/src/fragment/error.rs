//! Domain errors for fragment operations
//!
//! This module defines every error the fragment core can report. These are
//! domain-level errors: storage adapters translate their own failures into
//! `Backend` or `NotFound` before handing them back, so no infrastructure
//! type ever crosses this boundary.

use thiserror::Error;

use crate::fragment::media::MediaType;

/// Errors that can occur while creating, reading, converting or deleting fragments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    /// Constructor input was missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No fragment (or no payload) exists for the owner and id
    #[error("Fragment not found: {0}")]
    NotFound(String),

    /// The media type is unparseable or not in the supported set
    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),

    /// The filename extension has no mapped media type
    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    /// The target media type is valid but unreachable from the source type
    #[error("Cannot convert from {from} to {to}")]
    UnsupportedConversion { from: MediaType, to: MediaType },

    /// The compatibility table lists a pair the engine has no rule for
    #[error("Conversion from {from} to {to} is not implemented")]
    ConversionNotImplemented { from: MediaType, to: MediaType },

    /// An update tried to change the fragment's base media type
    #[error("Cannot change fragment type from {existing} to {requested}")]
    TypeMismatch {
        existing: MediaType,
        requested: MediaType,
    },

    /// The payload exceeds the configured size limit
    #[error("Payload size ({size} bytes) exceeds maximum allowed ({max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    /// The stored payload could not be interpreted as its declared type
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The storage backend failed or is in an inconsistent state
    #[error("Storage operation failed: {0}")]
    Backend(String),
}

impl FragmentError {
    /// Create a validation error with a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error with a message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an unsupported type error for the given content type
    pub fn unsupported_type(value: impl Into<String>) -> Self {
        Self::UnsupportedType(value.into())
    }

    /// Create an unsupported extension error
    pub fn unsupported_extension(ext: impl Into<String>) -> Self {
        Self::UnsupportedExtension(ext.into())
    }

    /// Create a malformed payload error with a message
    pub fn malformed_payload(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create a backend error with a message
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a payload too large error
    pub fn payload_too_large(size: usize, max: usize) -> Self {
        Self::PayloadTooLarge { size, max }
    }

    /// Returns true for errors caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Backend(_) | Self::ConversionNotImplemented { .. }
        )
    }
}

/// Result type alias for fragment operations
pub type Result<T> = std::result::Result<T, FragmentError>;

//! Owner extraction
//!
//! Authentication happens in front of this service. The authenticator puts
//! the caller's opaque owner id in a configured header; requests without it
//! are rejected.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use fragments_domain::OwnerId;

use crate::{error::ApiError, AppState};

/// The authenticated owner of the current request
#[derive(Debug, Clone)]
pub struct Owner(pub OwnerId);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.owner_header)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| OwnerId::parse(value.trim()).ok())
            .map(Owner)
            .ok_or(ApiError::Unauthorized)
    }
}

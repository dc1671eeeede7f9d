//! DTOs for fragment endpoints

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use fragments_domain::{FragmentListing, FragmentView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Fragment metadata as returned to clients
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FragmentDto {
    #[schema(example = "0192b5d8-7f3a-7cc1-9a57-1e2f6f7d1a2b")]
    pub id: String,
    #[schema(example = "11d4c22e42c8f61feaba154683dea407b101cfd90987dda9e342843263ca420a")]
    pub owner_id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Content-Type given at creation
    #[serde(rename = "type")]
    #[schema(example = "text/markdown; charset=utf-8")]
    pub content_type: String,
    /// Payload size in bytes
    pub size: u64,
}

impl From<FragmentView> for FragmentDto {
    fn from(view: FragmentView) -> Self {
        Self {
            id: view.id.to_string(),
            owner_id: view.owner_id.to_string(),
            created: view.created,
            updated: view.updated,
            content_type: view.content_type,
            size: view.size,
        }
    }
}

/// Either bare ids or full metadata, depending on `expand`
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FragmentList {
    Ids(Vec<String>),
    Expanded(Vec<FragmentDto>),
}

impl From<FragmentListing> for FragmentList {
    fn from(listing: FragmentListing) -> Self {
        match listing {
            FragmentListing::Ids(ids) => Self::Ids(ids.iter().map(ToString::to_string).collect()),
            FragmentListing::Expanded(fragments) => Self::Expanded(
                fragments
                    .iter()
                    .map(|fragment| FragmentDto::from(fragment.view()))
                    .collect(),
            ),
        }
    }
}

/// Query string of the list endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `true` to return full metadata instead of ids
    pub expand: Option<String>,
}

impl ListQuery {
    pub fn expand(&self) -> bool {
        self.expand.as_deref() == Some("true")
    }
}

/// Response body for list requests
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub fragments: FragmentList,
}

impl ListResponse {
    pub fn ok(fragments: FragmentList) -> Self {
        Self {
            status: "ok".to_string(),
            fragments,
        }
    }
}

/// Response body carrying one fragment's metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct FragmentResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub fragment: FragmentDto,
    /// URL of the new fragment, only set on creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FragmentResponse {
    pub fn ok(fragment: FragmentView) -> Self {
        Self {
            status: "ok".to_string(),
            fragment: fragment.into(),
            location: None,
        }
    }

    pub fn created(fragment: FragmentView, location: String) -> Self {
        Self {
            location: Some(location),
            ..Self::ok(fragment)
        }
    }
}

/// Response body for requests that only report success
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Error details
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = 404)]
    pub code: u16,
    #[schema(example = "Fragment not found")]
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "error")]
    pub status: String,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: ErrorBody {
                code: code.as_u16(),
                message: message.into(),
            },
        }
    }
}

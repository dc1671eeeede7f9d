//! Fragment handlers
//!
//! Each handler maps one HTTP request onto one fragment service operation.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    http::{
        header::{CONTENT_TYPE, HOST, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use fragments_domain::{FragmentError, FragmentId};
use tracing::info;

use crate::{
    auth::Owner,
    dto::fragments::{ErrorResponse, FragmentResponse, ListQuery, ListResponse, StatusResponse},
    error::ApiError,
    AppState,
};

/// List the caller's fragments
#[utoipa::path(
    get,
    path = "/v1/fragments",
    params(ListQuery),
    responses(
        (status = 200, description = "Fragment ids, or metadata when expanded", body = ListResponse),
        (status = 401, description = "No authenticated owner", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "fragments"
)]
pub async fn list_fragments(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let listing = state.fragment_service.list(&owner, query.expand()).await?;
    info!(count = listing.len(), expand = query.expand(), "Listed fragments");
    Ok(Json(ListResponse::ok(listing.into())))
}

/// Create a fragment from the raw request body
#[utoipa::path(
    post,
    path = "/v1/fragments",
    request_body(content = Vec<u8>, description = "Fragment data; Content-Type is the fragment type", content_type = "text/plain"),
    responses(
        (status = 201, description = "Fragment created", body = FragmentResponse),
        (status = 401, description = "No authenticated owner", body = ErrorResponse),
        (status = 413, description = "Payload too large", body = ErrorResponse),
        (status = 415, description = "Unsupported Content-Type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "fragments"
)]
pub async fn create_fragment(
    State(state): State<AppState>,
    Owner(owner): Owner,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body?;
    let content_type = request_content_type(&headers)?;
    let fragment = state
        .fragment_service
        .create(&owner, content_type, &body)
        .await?;

    let base = match &state.api_url {
        Some(url) => url.clone(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{}", host)
        }
    };
    let location = format!("{}/v1/fragments/{}", base, fragment.id);
    let location_header = HeaderValue::from_str(&location)
        .map_err(|err| ApiError::Internal(format!("invalid Location header: {err}")))?;

    info!(fragment_id = %fragment.id, size = fragment.size, "Created fragment");
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location_header)],
        Json(FragmentResponse::created(fragment, location)),
    )
        .into_response())
}

/// Get a fragment's data, converted when the id carries an extension
#[utoipa::path(
    get,
    path = "/v1/fragments/{id}",
    params(("id" = String, Path, description = "Fragment id, optionally followed by an extension such as .html")),
    responses(
        (status = 200, description = "Fragment data in the stored or requested type"),
        (status = 401, description = "No authenticated owner", body = ErrorResponse),
        (status = 404, description = "Fragment not found", body = ErrorResponse),
        (status = 415, description = "Unknown extension or impossible conversion", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "fragments"
)]
pub async fn get_fragment(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let (id, extension) = split_extension(&raw_id);
    let id = FragmentId::parse(id)?;

    let payload = state
        .fragment_service
        .fetch_payload(&owner, &id, extension)
        .await?;
    let content_type = HeaderValue::from_str(&payload.content_type)
        .map_err(|err| ApiError::Internal(format!("invalid Content-Type header: {err}")))?;

    info!(fragment_id = %id, content_type = %payload.content_type, "Serving fragment data");
    Ok(([(CONTENT_TYPE, content_type)], payload.data).into_response())
}

/// Get a fragment's metadata
#[utoipa::path(
    get,
    path = "/v1/fragments/{id}/info",
    params(("id" = String, Path, description = "Fragment id")),
    responses(
        (status = 200, description = "Fragment metadata", body = FragmentResponse),
        (status = 401, description = "No authenticated owner", body = ErrorResponse),
        (status = 404, description = "Fragment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "fragments"
)]
pub async fn get_fragment_info(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<FragmentResponse>, ApiError> {
    let id = FragmentId::parse(id)?;
    let fragment = state.fragment_service.fetch(&owner, &id).await?;
    Ok(Json(FragmentResponse::ok(fragment)))
}

/// Replace a fragment's data
#[utoipa::path(
    put,
    path = "/v1/fragments/{id}",
    params(("id" = String, Path, description = "Fragment id")),
    request_body(content = Vec<u8>, description = "New data; the base Content-Type must match the fragment's", content_type = "text/plain"),
    responses(
        (status = 200, description = "Fragment updated", body = FragmentResponse),
        (status = 400, description = "Content-Type differs from the fragment's type", body = ErrorResponse),
        (status = 401, description = "No authenticated owner", body = ErrorResponse),
        (status = 404, description = "Fragment not found", body = ErrorResponse),
        (status = 415, description = "Unsupported Content-Type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "fragments"
)]
pub async fn update_fragment(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<FragmentResponse>, ApiError> {
    let id = FragmentId::parse(id)?;
    let body = body?;
    let content_type = request_content_type(&headers)?;

    let fragment = state
        .fragment_service
        .update(&owner, &id, content_type, &body)
        .await?;

    info!(fragment_id = %id, size = fragment.size, "Updated fragment");
    Ok(Json(FragmentResponse::ok(fragment)))
}

/// Delete a fragment
#[utoipa::path(
    delete,
    path = "/v1/fragments/{id}",
    params(("id" = String, Path, description = "Fragment id")),
    responses(
        (status = 200, description = "Fragment deleted", body = StatusResponse),
        (status = 401, description = "No authenticated owner", body = ErrorResponse),
        (status = 404, description = "Fragment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "fragments"
)]
pub async fn delete_fragment(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = FragmentId::parse(id)?;
    state.fragment_service.delete(&owner, &id).await?;

    info!(fragment_id = %id, "Deleted fragment");
    Ok(Json(StatusResponse::ok()))
}

fn request_content_type(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(CONTENT_TYPE)
        .ok_or_else(|| FragmentError::unsupported_type("missing Content-Type"))?;
    let content_type = value.to_str().map_err(|_| {
        FragmentError::unsupported_type(String::from_utf8_lossy(value.as_bytes()))
    })?;
    Ok(content_type)
}

/// Split `abc.json` into `("abc", Some(".json"))`
fn split_extension(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once('.') {
        Some((id, ext)) if !id.is_empty() && !ext.is_empty() => (id, Some(&raw[id.len()..])),
        _ => (raw, None),
    }
}

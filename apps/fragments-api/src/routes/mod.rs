//! API routes

pub mod fragments;

use axum::{extract::DefaultBodyLimit, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::fragments::{
        ErrorBody, ErrorResponse, FragmentDto, FragmentList, FragmentResponse, ListResponse,
        StatusResponse,
    },
    handlers, AppState,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::fragments::list_fragments,
        handlers::fragments::create_fragment,
        handlers::fragments::get_fragment,
        handlers::fragments::get_fragment_info,
        handlers::fragments::update_fragment,
        handlers::fragments::delete_fragment,
        health_handler
    ),
    components(
        schemas(
            FragmentDto,
            FragmentList,
            FragmentResponse,
            ListResponse,
            StatusResponse,
            ErrorBody,
            ErrorResponse
        )
    ),
    tags(
        (name = "fragments", description = "Fragment storage and conversion endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Fragments API",
        version = "0.1.0",
        description = "Stores typed text fragments and serves them verbatim or converted"
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.fragment_service.config().max_payload_size;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(fragments::routes())
        .route("/health", axum::routing::get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}

//! Fragment routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::fragments::{
        create_fragment, delete_fragment, get_fragment, get_fragment_info, list_fragments,
        update_fragment,
    },
    AppState,
};

/// Create fragment routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/fragments", post(create_fragment).get(list_fragments))
        .route(
            "/v1/fragments/:id",
            get(get_fragment).put(update_fragment).delete(delete_fragment),
        )
        .route("/v1/fragments/:id/info", get(get_fragment_info))
}

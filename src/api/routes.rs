use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    publish::{health, preview, publish},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/preview", post(preview))
        .route("/api/publish", post(publish))
        .with_state(state)
}

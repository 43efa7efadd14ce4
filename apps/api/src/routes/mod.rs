pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::review::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless diff of two document versions
        .route("/api/v1/diff", post(handlers::handle_diff))
        // Review session lifecycle
        .route(
            "/api/v1/cvs/:id/review",
            post(handlers::handle_init_review),
        )
        .route(
            "/api/v1/cvs/:id/changes",
            get(handlers::handle_get_changes).post(handlers::handle_post_changes),
        )
        .with_state(state)
}

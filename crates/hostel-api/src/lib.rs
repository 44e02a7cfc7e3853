pub mod auth;
pub mod complaints;
pub mod error;
pub mod middleware;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

pub use auth::{AdminRegistry, AppState, AppStateInner};
pub use error::ApiError;

/// Build the REST surface. Transport layers (CORS, tracing, static files)
/// are added by the server binary.
pub fn router(state: AppState) -> Router {
    let admin_guard = from_fn_with_state(state.clone(), middleware::require_admin);

    Router::new()
        .route(
            "/api/complaints",
            post(complaints::create_complaint).get(complaints::list_complaints),
        )
        .route("/api/complaints/revision", get(complaints::get_revision))
        .route(
            "/api/complaints/{id}",
            put(complaints::update_complaint)
                .delete(complaints::delete_complaint)
                .route_layer(admin_guard)
                .get(complaints::get_complaint),
        )
        .route("/api/admin/login", post(auth::admin_login))
        .route("/health", get(health))
        .with_state(state)
}

/// GET /health, liveness check (no auth).
pub async fn health() -> &'static str {
    "ok"
}

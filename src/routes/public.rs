use crate::{AppState, access::SIGN_IN_PATH, handlers, pages};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. `/api/session` answers for anonymous
/// callers too, and `/api/me` does its own stored-user check.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .route("/", get(pages::landing))
        .route(SIGN_IN_PATH, get(pages::sign_in))
        // GET /api/session
        // Identity source for the browser-side route guard.
        .route("/api/session", get(handlers::get_session))
        .route("/api/me", get(handlers::get_me))
}

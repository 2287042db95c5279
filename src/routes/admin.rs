use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Mounted at `/api/admin`. Every handler takes `Verified<AdminArea>`, so the
/// caller's stored role is checked against the database on each request,
/// whatever the session token claims.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/users
        .route("/users", get(handlers::list_users))
        // GET /api/admin/stats
        // User counts per role and the number of portfolio items.
        .route("/stats", get(handlers::get_admin_stats))
        // PUT /api/admin/users/{id}/role
        .route("/users/{id}/role", put(handlers::update_user_role))
}

use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Client Router Module
///
/// Mounted at `/api/client`. Browsing artisans and their work.
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/artisans", get(handlers::list_artisans))
        .route(
            "/artisans/{id}/portfolio",
            get(handlers::get_artisan_portfolio),
        )
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Artisan Router Module
///
/// Mounted at `/api/artisan`. Portfolio management for the calling artisan;
/// every item operation is scoped to the verified user's own id.
pub fn artisan_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/portfolio",
            get(handlers::get_my_portfolio).post(handlers::create_portfolio_item),
        )
        // POST /api/artisan/portfolio/upload-url
        // Short-lived signed URL for a direct browser-to-bucket image upload.
        .route("/portfolio/upload-url", post(handlers::get_upload_url))
        .route("/portfolio/{id}", delete(handlers::delete_portfolio_item))
}

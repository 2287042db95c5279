use axum::{Router, extract::FromRef, http::HeaderName, middleware::from_fn_with_state};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access policy: roles, the role-to-path table and the shared decision.
pub mod access;
pub mod auth;
pub mod client_guard;
pub mod config;
pub mod errors;
pub mod guards;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod repository;
pub mod storage;

pub mod routes;
use routes::{admin, artisan, client, dashboards, public};

// --- Public Re-exports ---

pub use access::{Role, SessionIdentity, Verdict};
pub use auth::{IdentityProvider, IdentityProviderState, JwtIdentityProvider};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MediaStoreState, MockMediaStore, S3MediaStore};

/// ApiDoc
///
/// OpenAPI document for the JSON API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_session, handlers::get_me,
        handlers::list_users, handlers::get_admin_stats, handlers::update_user_role,
        handlers::get_my_portfolio, handlers::create_portfolio_item,
        handlers::delete_portfolio_item, handlers::get_upload_url,
        handlers::list_artisans, handlers::get_artisan_portfolio
    ),
    components(
        schemas(
            access::Role, access::SessionIdentity,
            models::UserRecord, models::PortfolioItem, models::ArtisanProfile,
            models::AdminStats, models::CreatePortfolioItemRequest, models::UpdateRoleRequest,
            models::UploadUrlRequest, models::UploadUrlResponse, models::SessionView,
        )
    ),
    tags(
        (name = "artisanlink", description = "ArtisanLink marketplace API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state handed to every request. Each service sits behind a
/// trait object so tests can swap in mocks.
#[derive(Clone)]
pub struct AppState {
    /// System of record for users, roles and portfolios.
    pub repo: RepositoryState,
    /// Object storage for portfolio images.
    pub storage: MediaStoreState,
    /// External identity provider boundary.
    pub identity: IdentityProviderState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MediaStoreState {
    fn from_ref(app_state: &AppState) -> MediaStoreState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for IdentityProviderState {
    fn from_ref(app_state: &AppState) -> IdentityProviderState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles every route, puts the edge gate in front of all of them, and adds the
/// request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .nest("/api/admin", admin::admin_routes())
        .nest("/api/artisan", artisan::artisan_routes())
        .nest("/api/client", client::client_routes());

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(dashboards::dashboard_routes())
        .merge(api)
        // Edge gate: coarse redirect before any page handler runs. The layout guard
        // and the data-layer check repeat the decision further in.
        .layer(from_fn_with_state(state.clone(), middleware::edge_gate))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, tagged with the `x-request-id` set by the layer above so
/// every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

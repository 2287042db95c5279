use crate::{
    AppState,
    access::{Role, SessionIdentity},
    errors::ApiError,
    guards::{AdminArea, ArtisanArea, ClientArea, Member, Verified},
    models::{
        AdminStats, ArtisanProfile, CreatePortfolioItemRequest, PortfolioItem, SessionView,
        UpdateRoleRequest, UploadUrlRequest, UploadUrlResponse, UserRecord,
    },
    storage::sanitize_key,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Object key prefix owned by one artisan.
fn portfolio_prefix(artisan_id: &str) -> String {
    format!("portfolio/{artisan_id}/")
}

// --- Session ---

/// get_session
///
/// [Public Route] The identity the client SDK feeds into its route guard. Never
/// rejects for a missing session; an anonymous identity is a valid answer.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Resolved session", body = SessionView))
)]
pub async fn get_session(identity: SessionIdentity) -> Json<SessionView> {
    let home = identity.home().to_string();
    Json(SessionView { identity, home })
}

/// get_me
///
/// [Member Route] The caller's stored profile, with the role from the database.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Profile", body = UserRecord),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "No stored user")
    )
)]
pub async fn get_me(Member(user): Member) -> Json<UserRecord> {
    Json(user)
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = [UserRecord]),
        (status = 403, description = "Stored role is not admin"),
        (status = 500, description = "Database unavailable")
    )
)]
pub async fn list_users(
    _admin: Verified<AdminArea>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    Ok(Json(state.repo.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminStats),
        (status = 500, description = "Database unavailable")
    )
)]
pub async fn get_admin_stats(
    _admin: Verified<AdminArea>,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(state.repo.get_stats().await?))
}

/// update_user_role
///
/// [Admin Route] Changes a user's stored role. This is the value every data-layer
/// check reads, so it takes effect on the user's next API call.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = UserRecord),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "No such user")
    )
)]
pub async fn update_user_role(
    Verified { user: admin, .. }: Verified<AdminArea>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserRecord>, ApiError> {
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown role '{}'", payload.role)))?;

    let updated = state
        .repo
        .set_user_role(&id, role)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(admin = %admin.id, user = %id, %role, "role changed");
    Ok(Json(updated))
}

// --- Artisan ---

#[utoipa::path(
    get,
    path = "/api/artisan/portfolio",
    responses((status = 200, description = "My portfolio", body = [PortfolioItem]))
)]
pub async fn get_my_portfolio(
    Verified { user, .. }: Verified<ArtisanArea>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PortfolioItem>>, ApiError> {
    Ok(Json(state.repo.get_portfolio(&user.id).await?))
}

#[utoipa::path(
    post,
    path = "/api/artisan/portfolio",
    request_body = CreatePortfolioItemRequest,
    responses(
        (status = 201, description = "Created", body = PortfolioItem),
        (status = 400, description = "Missing title, or an image key outside the caller's prefix")
    )
)]
pub async fn create_portfolio_item(
    Verified { user, .. }: Verified<ArtisanArea>,
    State(state): State<AppState>,
    Json(payload): Json<CreatePortfolioItemRequest>,
) -> Result<(StatusCode, Json<PortfolioItem>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    // Only objects uploaded through this artisan's own upload URLs may be attached.
    if let Some(key) = payload.image_key.as_deref() {
        let prefix = portfolio_prefix(&user.id);
        if !key.starts_with(&prefix) || sanitize_key(key) != key {
            return Err(ApiError::BadRequest(format!(
                "image key must live under '{prefix}'"
            )));
        }
    }

    let item = state.repo.create_portfolio_item(&user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// delete_portfolio_item
///
/// [Artisan Route] Owner-only: an item belonging to someone else is reported as
/// missing.
#[utoipa::path(
    delete,
    path = "/api/artisan/portfolio/{id}",
    params(("id" = Uuid, Path, description = "Portfolio item ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not yours")
    )
)]
pub async fn delete_portfolio_item(
    Verified { user, .. }: Verified<ArtisanArea>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_portfolio_item(id, &user.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// get_upload_url
///
/// [Artisan Route] Signed upload URL for a portfolio image. Keys live under the
/// artisan's own prefix and get a fresh UUID so uploads never collide.
#[utoipa::path(
    post,
    path = "/api/artisan/portfolio/upload-url",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "URL", body = UploadUrlResponse),
        (status = 400, description = "Not an image")
    )
)]
pub async fn get_upload_url(
    Verified { user, .. }: Verified<ArtisanArea>,
    State(state): State<AppState>,
    Json(payload): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    if !payload.file_type.starts_with("image/") {
        return Err(ApiError::BadRequest(format!(
            "unsupported file type '{}'",
            payload.file_type
        )));
    }

    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let image_key = format!("{}{}.{}", portfolio_prefix(&user.id), Uuid::new_v4(), extension);

    let upload_url = state
        .storage
        .presign_upload(&image_key, &payload.file_type)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(UploadUrlResponse {
        upload_url,
        image_key,
    }))
}

// --- Client ---

#[utoipa::path(
    get,
    path = "/api/client/artisans",
    responses(
        (status = 200, description = "Artisans", body = [ArtisanProfile]),
        (status = 500, description = "Database unavailable")
    )
)]
pub async fn list_artisans(
    _client: Verified<ClientArea>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ArtisanProfile>>, ApiError> {
    Ok(Json(state.repo.list_artisans().await?))
}

#[utoipa::path(
    get,
    path = "/api/client/artisans/{id}/portfolio",
    params(("id" = String, Path, description = "Artisan user ID")),
    responses(
        (status = 200, description = "Portfolio", body = [PortfolioItem]),
        (status = 404, description = "Not an artisan")
    )
)]
pub async fn get_artisan_portfolio(
    _client: Verified<ClientArea>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PortfolioItem>>, ApiError> {
    let artisan = state.repo.get_user(&id).await.ok_or(ApiError::NotFound)?;
    if artisan.stored_role() != Some(Role::Artisan) {
        return Err(ApiError::NotFound);
    }
    Ok(Json(state.repo.get_portfolio(&artisan.id).await?))
}

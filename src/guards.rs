//! Section guards shared by dashboard pages and the JSON API.
//!
//! `LayoutGuard<A>` is the page-level recheck: it runs the same decision as the
//! edge gate against a freshly resolved session. `Verified<A>` is the data-layer
//! check and ignores the session role claim entirely, going to the `users` table
//! instead.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use std::marker::PhantomData;

use crate::{
    access::{self, Role, SessionIdentity, Verdict},
    auth::IdentityProviderState,
    config::AppConfig,
    errors::ApiError,
    models::UserRecord,
    repository::{Repository, RepositoryState},
};

/// Area
///
/// Type-level name for one dashboard section and the role that owns it.
pub trait Area: Send + Sync + 'static {
    const ROLE: Role;
}

pub struct AdminArea;
pub struct ArtisanArea;
pub struct ClientArea;

impl Area for AdminArea {
    const ROLE: Role = Role::Admin;
}

impl Area for ArtisanArea {
    const ROLE: Role = Role::Artisan;
}

impl Area for ClientArea {
    const ROLE: Role = Role::Client;
}

// --- Layout Guard ---

/// LayoutGuard
///
/// Server-side recheck at the entry of a dashboard section. Resolves the session
/// again (it does not trust that the edge gate ran) and either yields the identity
/// or rejects with a temporary redirect.
pub struct LayoutGuard<A: Area> {
    pub identity: SessionIdentity,
    _area: PhantomData<fn() -> A>,
}

impl<A: Area> LayoutGuard<A> {
    /// check
    ///
    /// The guard decision without the extraction plumbing.
    pub fn check(identity: SessionIdentity) -> Result<Self, &'static str> {
        match access::decide(&identity, A::ROLE) {
            Verdict::Proceed => Ok(Self {
                identity,
                _area: PhantomData,
            }),
            Verdict::Redirect { target, reason } => {
                let section = A::ROLE;
                tracing::info!(%section, target, ?reason, "layout guard redirect");
                Err(target)
            }
        }
    }
}

impl<S, A> FromRequestParts<S> for LayoutGuard<A>
where
    S: Send + Sync,
    A: Area,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    IdentityProviderState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = SessionIdentity::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Self::check(identity).map_err(|target| Redirect::temporary(target).into_response())
    }
}

// --- Data Access Layer ---

/// verify_stored_role
///
/// The data-layer authorization check. Only the session's user id is used; the
/// role comes from the system of record.
/// - no user id → 401
/// - no stored user, unrecognized stored role, or wrong role → 403
pub async fn verify_stored_role(
    repo: &dyn Repository,
    identity: &SessionIdentity,
    required: Option<Role>,
) -> Result<UserRecord, ApiError> {
    let user_id = identity.user_id.as_deref().ok_or(ApiError::Unauthorized)?;

    let Some(user) = repo.get_user(user_id).await else {
        tracing::warn!(user_id, "no stored user for session");
        return Err(ApiError::Forbidden);
    };

    let Some(stored) = user.stored_role() else {
        tracing::warn!(user_id, stored = %user.role, "stored role is not recognized");
        return Err(ApiError::Forbidden);
    };

    if identity.role != Some(stored) {
        tracing::warn!(
            user_id,
            claimed = ?identity.role,
            %stored,
            "session role claim disagrees with stored role"
        );
    }

    if let Some(required) = required {
        if stored != required {
            tracing::info!(user_id, %stored, %required, "data access denied");
            return Err(ApiError::Forbidden);
        }
    }

    Ok(user)
}

/// Verified
///
/// Extractor for privileged API handlers: a stored user whose stored role owns
/// section `A`.
pub struct Verified<A: Area> {
    pub user: UserRecord,
    _area: PhantomData<fn() -> A>,
}

impl<A: Area> Verified<A> {
    /// Builds the extractor output from an already verified record.
    pub fn from_user(user: UserRecord) -> Self {
        Self {
            user,
            _area: PhantomData,
        }
    }
}

impl<S, A> FromRequestParts<S> for Verified<A>
where
    S: Send + Sync,
    A: Area,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    IdentityProviderState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = SessionIdentity::from_request_parts(parts, state).await?;
        let repo = RepositoryState::from_ref(state);
        let user = verify_stored_role(repo.as_ref(), &identity, Some(A::ROLE)).await?;
        Ok(Self::from_user(user))
    }
}

/// Member
///
/// Any stored user, whatever the role.
pub struct Member(pub UserRecord);

impl<S> FromRequestParts<S> for Member
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    IdentityProviderState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = SessionIdentity::from_request_parts(parts, state).await?;
        let repo = RepositoryState::from_ref(state);
        verify_stored_role(repo.as_ref(), &identity, None)
            .await
            .map(Member)
    }
}

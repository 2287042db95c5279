use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    access::SessionIdentity,
    config::{AppConfig, Env, SessionKey},
    repository::RepositoryState,
};

/// Cookie the identity provider's frontend SDK stores the session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Header accepted in `Env::Local` to impersonate a stored user.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// Payload of a session token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the provider's opaque user id.
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    /// Public metadata attached to the user by the provider; carries the role claim.
    #[serde(default)]
    pub metadata: SessionMetadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub role: Option<String>,
}

/// AuthError
///
/// Failure of the identity accessor itself. A bad or missing token is not an
/// error (it resolves to an anonymous identity); this is the provider being
/// unusable, and the containing request fails.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("invalid session verification key: {0}")]
    InvalidKey(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "session resolution failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

/// IdentityProvider
///
/// Boundary to the external identity provider: turns a session token into a
/// `SessionIdentity`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<SessionIdentity, AuthError>;
}

pub type IdentityProviderState = Arc<dyn IdentityProvider>;

/// JwtIdentityProvider
///
/// Verifies provider-issued JWTs locally, with either a shared HS256 secret or the
/// provider's RS256 public key.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn from_key(session_key: &SessionKey) -> Result<Self, AuthError> {
        let (key, algorithm) = match session_key {
            SessionKey::Secret(secret) => {
                (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256)
            }
            SessionKey::RsaPem(pem) => (
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::InvalidKey(e.to_string()))?,
                Algorithm::RS256,
            ),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Ok(Self { key, validation })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<SessionIdentity, AuthError> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => Ok(SessionIdentity::from_claim(
                data.claims.sub,
                data.claims.metadata.role.as_deref(),
            )),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("expired session token"),
                    _ => tracing::debug!(error = %e, "rejected session token"),
                }
                Ok(SessionIdentity::anonymous())
            }
        }
    }
}

/// session_token
///
/// Bearer header first, then the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// SessionIdentity Extractor
///
/// Resolves the caller's identity for any handler, guard or middleware:
/// 1. Local bypass: `x-user-id` naming a stored user (Env::Local only).
/// 2. Token from the `Authorization` header or the `__session` cookie.
/// 3. Verification through the configured `IdentityProvider`.
///
/// Absent or invalid credentials give `SessionIdentity::anonymous()`. Only a
/// provider failure rejects, with 500.
impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    IdentityProviderState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let dev_user = parts
                .headers
                .get(DEV_USER_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            if let Some(user_id) = dev_user {
                let repo = RepositoryState::from_ref(state);
                // The user must exist so the stored role is what the guards see.
                if let Some(user) = repo.get_user(&user_id).await {
                    let role = user.stored_role();
                    return Ok(SessionIdentity::new(user.id, role));
                }
                tracing::debug!(user_id = %user_id, "local bypass header names an unknown user");
            }
        }

        let Some(token) = session_token(parts) else {
            return Ok(SessionIdentity::anonymous());
        };

        let provider = IdentityProviderState::from_ref(state);
        provider.verify(&token).await
    }
}

#![allow(dead_code)]

use artisanlink::{
    AppState, SessionIdentity,
    access::Role,
    auth::{AuthError, Claims, IdentityProvider, JwtIdentityProvider, SessionMetadata},
    config::{AppConfig, Env, SessionKey},
    models::{AdminStats, ArtisanProfile, CreatePortfolioItemRequest, PortfolioItem, UserRecord},
    repository::{RepoError, Repository},
    storage::MockMediaStore,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use std::{
    sync::{Arc, Mutex},
    time::SystemTime,
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-session-secret-0123456789";

/// Fixed RS256 keypair standing in for an identity provider that signs with RSA.
pub const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/session_rs256_private.pem");
pub const RSA_PUBLIC_PEM: &str = include_str!("../fixtures/session_rs256_public.pem");

// --- Mock Repository ---

/// In-memory system of record. Users are seeded per test; portfolio writes are
/// kept so handlers can be observed end to end.
#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<Vec<UserRecord>>,
    pub portfolio: Mutex<Vec<PortfolioItem>>,
    /// When true, every query except the `get_user` authorization lookup fails.
    pub database_down: bool,
}

impl MockRepo {
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    /// Users still resolve, so guards pass and the handler's own query fails.
    pub fn with_database_down(users: Vec<UserRecord>) -> Self {
        Self {
            database_down: true,
            ..Self::with_users(users)
        }
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.database_down {
            return Err(RepoError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn add_item(&self, artisan_id: &str, title: &str) -> PortfolioItem {
        let item = PortfolioItem {
            id: Uuid::new_v4(),
            artisan_id: artisan_id.to_string(),
            title: title.to_string(),
            description: None,
            image_key: None,
            created_at: Utc::now(),
        };
        self.portfolio.lock().unwrap().push(item.clone());
        item
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError> {
        self.check()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn set_user_role(&self, id: &str, role: Role) -> Result<Option<UserRecord>, RepoError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.role = role.as_str().to_string();
        Ok(Some(user.clone()))
    }

    async fn get_stats(&self) -> Result<AdminStats, RepoError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        let count = |role: &str| users.iter().filter(|u| u.role == role).count() as i64;
        Ok(AdminStats {
            total_users: users.len() as i64,
            admins: count("admin"),
            artisans: count("artisan"),
            clients: count("client"),
            portfolio_items: self.portfolio.lock().unwrap().len() as i64,
        })
    }

    async fn list_artisans(&self) -> Result<Vec<ArtisanProfile>, RepoError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == "artisan")
            .map(|u| ArtisanProfile {
                id: u.id.clone(),
                display_name: u.display_name.clone(),
                location: u.location.clone(),
            })
            .collect())
    }

    async fn get_portfolio(&self, artisan_id: &str) -> Result<Vec<PortfolioItem>, RepoError> {
        self.check()?;
        Ok(self
            .portfolio
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.artisan_id == artisan_id)
            .cloned()
            .collect())
    }

    async fn create_portfolio_item(
        &self,
        artisan_id: &str,
        req: CreatePortfolioItemRequest,
    ) -> Result<PortfolioItem, RepoError> {
        self.check()?;
        let item = PortfolioItem {
            id: Uuid::new_v4(),
            artisan_id: artisan_id.to_string(),
            title: req.title,
            description: req.description,
            image_key: req.image_key,
            created_at: Utc::now(),
        };
        self.portfolio.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn delete_portfolio_item(&self, id: Uuid, artisan_id: &str) -> Result<bool, RepoError> {
        self.check()?;
        let mut items = self.portfolio.lock().unwrap();
        let before = items.len();
        items.retain(|item| !(item.id == id && item.artisan_id == artisan_id));
        Ok(items.len() < before)
    }
}

// --- Identity Providers ---

/// Provider that is always down.
pub struct UnreachableProvider;

#[async_trait]
impl IdentityProvider for UnreachableProvider {
    async fn verify(&self, _token: &str) -> Result<SessionIdentity, AuthError> {
        Err(AuthError::ProviderUnavailable("connection refused".to_string()))
    }
}

// --- Fixtures ---

pub fn user(id: &str, role: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        email: format!("{id}@artisanlink.test"),
        role: role.to_string(),
        display_name: Some(format!("User {id}")),
        location: Some("Nairobi".to_string()),
        created_at: Utc::now(),
    }
}

/// Signs a session token the way the identity provider would.
pub fn token(user_id: &str, role: Option<&str>, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
        metadata: SessionMetadata {
            role: role.map(str::to_string),
        },
    };

    let key = EncodingKey::from_secret(TEST_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

/// Same claims as `token`, signed RS256 with the fixture private key.
pub fn rs256_token(user_id: &str, role: Option<&str>) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: (now + 3600) as usize,
        metadata: SessionMetadata {
            role: role.map(str::to_string),
        },
    };

    let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

pub fn valid_token(user_id: &str, role: &str) -> String {
    token(user_id, Some(role), 3600)
}

pub fn test_config(env: Env) -> AppConfig {
    let mut config = AppConfig::default();
    config.env = env;
    config.session_key = SessionKey::Secret(TEST_SECRET.to_string());
    config
}

pub fn app_state(env: Env, repo: MockRepo) -> AppState {
    let config = test_config(env);
    let identity = JwtIdentityProvider::from_key(&config.session_key).unwrap();
    AppState {
        repo: Arc::new(repo),
        storage: Arc::new(MockMediaStore::new()),
        identity: Arc::new(identity),
        config,
    }
}

pub fn app_state_with_provider(
    env: Env,
    repo: MockRepo,
    provider: impl IdentityProvider + 'static,
) -> AppState {
    AppState {
        identity: Arc::new(provider),
        ..app_state(env, repo)
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn request_parts(uri: &str) -> Parts {
    let (parts, _) = request(Method::GET, uri).into_parts();
    parts
}

pub fn parts_with_token(uri: &str, token: &str) -> Parts {
    let (parts, _) = get_with_token(uri, token).into_parts();
    parts
}

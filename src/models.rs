use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::{Role, SessionIdentity};

// --- Core Application Schemas (Mapped to Database) ---

/// UserRecord
///
/// A row of the `users` table: the system of record for roles. The id is the
/// identity provider's opaque user id, so it is kept as text.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    // 'admin', 'artisan' or 'client'. Parsed with `Role::parse` at every check.
    pub role: String,
    pub display_name: Option<String>,
    pub location: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The stored role, if the column holds a recognized value.
    pub fn stored_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// PortfolioItem
///
/// A piece of work an artisan showcases to prospective clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PortfolioItem {
    pub id: Uuid,
    // FK to users.id (owning artisan).
    pub artisan_id: String,
    pub title: String,
    pub description: Option<String>,
    // Object key of the uploaded image, if any.
    pub image_key: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ArtisanProfile
///
/// The public face of an artisan as seen by clients browsing the marketplace.
/// Never carries the email address.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ArtisanProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub location: Option<String>,
}

/// AdminStats
///
/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct AdminStats {
    pub total_users: i64,
    pub admins: i64,
    pub artisans: i64,
    pub clients: i64,
    pub portfolio_items: i64,
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePortfolioItemRequest {
    pub title: String,
    pub description: Option<String>,
    // Key returned by the upload-url endpoint after the client finished uploading.
    pub image_key: Option<String>,
}

/// UpdateRoleRequest
///
/// Body of `PUT /api/admin/users/{id}/role`. The role is taken as a raw string so an
/// unknown value yields 400 rather than a JSON rejection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRoleRequest {
    #[schema(example = "artisan")]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct UploadUrlRequest {
    /// Original filename, used to derive the extension.
    #[schema(example = "carved_stool.jpg")]
    pub filename: String,
    /// MIME type the upload is constrained to.
    #[schema(example = "image/jpeg")]
    pub file_type: String,
}

// --- Response Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub image_key: String,
}

/// SessionView
///
/// What `GET /api/session` returns to the client SDK: the resolved identity and
/// the path it belongs on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, PartialEq)]
#[ts(export)]
pub struct SessionView {
    pub identity: SessionIdentity,
    pub home: String,
}

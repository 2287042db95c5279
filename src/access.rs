use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Static Routing Table ---

/// Where every unauthenticated or unrecognized identity is sent.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Role
///
/// The three marketplace roles carried in the session `metadata.role` claim and
/// stored in the `users.role` column. Each role owns exactly one dashboard section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Artisan,
    Client,
}

impl Role {
    /// Every role, in the order the dashboards are checked.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Artisan, Role::Client];

    /// home
    ///
    /// The role-to-path mapping. This is the only place the dashboard prefixes
    /// are spelled out; every redirect and every prefix match reads from here.
    pub fn home(self) -> &'static str {
        match self {
            Role::Admin => "/admin-dashboard",
            Role::Artisan => "/artisan-dashboard",
            Role::Client => "/client-dashboard",
        }
    }

    /// parse
    ///
    /// Case-insensitive parse of a role claim or stored role column.
    /// Anything outside the three known values is `None` and is treated as "no role".
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "artisan" => Some(Role::Artisan),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Artisan => "artisan",
            Role::Client => "client",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Session Identity ---

/// SessionIdentity
///
/// The identity resolved for one request: an opaque user id from the identity
/// provider and the role claim it carried. Both halves may be absent. The value is
/// read-only for the lifetime of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionIdentity {
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl SessionIdentity {
    /// No session at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(user_id: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            role,
        }
    }

    /// Builds an identity from a raw role claim. Unknown claims collapse to `None`.
    pub fn from_claim(user_id: impl Into<String>, role_claim: Option<&str>) -> Self {
        let role = role_claim.and_then(Role::parse);
        if role.is_none() {
            if let Some(raw) = role_claim {
                tracing::debug!(claim = raw, "unrecognized role claim ignored");
            }
        }
        Self::new(user_id, role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The dashboard this identity lands on, or the sign-in page.
    pub fn home(&self) -> &'static str {
        match (&self.user_id, self.role) {
            (Some(_), Some(role)) => role.home(),
            _ => SIGN_IN_PATH,
        }
    }
}

// --- Verdicts ---

/// DenyReason
///
/// Why a request was turned away. Only used for logging; the redirect target
/// alone decides the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No user id in the session.
    Unauthenticated,
    /// A user id without a recognized role claim.
    UnknownRole,
    /// A known role asking for another role's section.
    RoleMismatch(Role),
}

/// Verdict
///
/// The outcome of the three-way branch every guard layer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Redirect {
        target: &'static str,
        reason: DenyReason,
    },
}

impl Verdict {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Verdict::Proceed)
    }

    /// The redirect target, or `None` when the request may continue.
    pub fn target(&self) -> Option<&'static str> {
        match self {
            Verdict::Proceed => None,
            Verdict::Redirect { target, .. } => Some(*target),
        }
    }
}

/// evaluate
///
/// The single decision shared by the Edge Gate, the Layout Guard and the client
/// Route Guard:
/// - no user id → sign-in
/// - user id but no known role → sign-in
/// - role not accepted → that role's own dashboard
/// - otherwise → proceed
pub fn evaluate<F>(identity: &SessionIdentity, accepts: F) -> Verdict
where
    F: Fn(Role) -> bool,
{
    if identity.user_id.is_none() {
        return Verdict::Redirect {
            target: SIGN_IN_PATH,
            reason: DenyReason::Unauthenticated,
        };
    }

    match identity.role {
        None => Verdict::Redirect {
            target: SIGN_IN_PATH,
            reason: DenyReason::UnknownRole,
        },
        Some(role) if accepts(role) => Verdict::Proceed,
        Some(role) => Verdict::Redirect {
            target: role.home(),
            reason: DenyReason::RoleMismatch(role),
        },
    }
}

/// Decision for a section owned by exactly one role.
pub fn decide(identity: &SessionIdentity, required: Role) -> Verdict {
    evaluate(identity, |role| role == required)
}

/// protected_role
///
/// Returns the role whose dashboard prefix owns `path`. A prefix matches the exact
/// path or anything below it on a segment boundary, so `/admin-dashboard/settings`
/// is protected and `/admin-dashboards` is not.
pub fn protected_role(path: &str) -> Option<Role> {
    Role::ALL.into_iter().find(|role| {
        let prefix = role.home();
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// gate
///
/// The Edge Gate decision for an arbitrary request path.
pub fn gate(path: &str, identity: &SessionIdentity) -> Verdict {
    match protected_role(path) {
        Some(required) => decide(identity, required),
        None => Verdict::Proceed,
    }
}

use chrono::{DateTime, Utc};

use roster_auth::{JwtClaims, Principal, Role};
use roster_core::UserId;

/// Principal context for a request (authenticated identity + role snapshot).
///
/// Derived from verified access-token claims; the role is the one embedded at
/// issuance and may lag a later role change until the token is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    expires_at: Option<DateTime<Utc>>,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            expires_at: None,
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            principal: Principal {
                user_id: claims.uid,
                username: claims.sub.clone(),
                role: claims.role,
            },
            expires_at: claims.expires_at(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    /// When the presented access token stops being accepted.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

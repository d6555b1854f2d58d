use serde::{Deserialize, Serialize};

use roster_auth::{AccessGrant, IssuedCredentials, Permission, Role, RoleChange, UserProfile};
use roster_core::UserId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Accepted only as `"User"`; public registration never grants more.
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserProfile,
    pub permissions: Vec<Permission>,
}

impl From<IssuedCredentials> for LoginResponse {
    fn from(issued: IssuedCredentials) -> Self {
        Self {
            access: issued.access,
            refresh: issued.refresh,
            token_type: "Bearer",
            expires_in: issued.expires_in,
            user: issued.user.profile(),
            permissions: issued.permissions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<AccessGrant> for RefreshResponse {
    fn from(grant: AccessGrant) -> Self {
        Self {
            access: grant.access,
            token_type: "Bearer",
            expires_in: grant.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleChangeResponse {
    pub id: UserId,
    pub username: String,
    pub previous_role: Role,
    pub role: Role,
    pub detail: &'static str,
}

impl From<RoleChange> for RoleChangeResponse {
    fn from(change: RoleChange) -> Self {
        Self {
            id: change.user.id,
            username: change.user.username,
            previous_role: change.previous,
            role: change.user.role,
            detail: "role updated",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub expires_at: Option<String>,
}

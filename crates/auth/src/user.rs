//! User account entity.
//!
//! Rows are owned by a [`crate::UserStore`]; this module only defines their
//! shape and the minimal input checks applied before a row is written.

use chrono::{DateTime, Utc};
use serde::Serialize;

use roster_core::{DomainError, DomainResult, UserId};

use crate::{Principal, Role};

/// A stored user account.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// The principal this account acts as.
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }

    /// Public projection (no secret material).
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("date_joined", &self.date_joined)
            .finish()
    }
}

/// Externally visible user fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Input for creating an account.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    /// Trim and normalize fields, rejecting obviously malformed input.
    ///
    /// Password strength rules are not enforced here.
    pub fn normalized(self) -> DomainResult<Self> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::validation("password", "password cannot be empty"));
        }

        Ok(Self {
            username,
            email,
            password: self.password,
            role: self.role,
        })
    }
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Partial update of profile fields. The role is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn normalized(self) -> DomainResult<Self> {
        Ok(Self {
            username: self.username.as_deref().map(normalize_username).transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

fn normalize_username(raw: &str) -> DomainResult<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(DomainError::validation("username", "username cannot be empty"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username", "username cannot contain whitespace"));
    }
    Ok(username.to_string())
}

fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("email", "invalid email format"));
    }
    Ok(email.to_lowercase())
}

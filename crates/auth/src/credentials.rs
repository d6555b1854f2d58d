//! Credential issuance and validation.
//!
//! Login verifies a username/secret pair against the store and mints an
//! access + refresh token pair. Refresh re-reads the subject so a role change
//! takes effect on the next refresh; an access token already in circulation
//! keeps its role snapshot until it expires.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use roster_core::{DomainError, UserId};

use crate::claims::{JwtClaims, TokenKind};
use crate::password::{CredentialHasher, HashError};
use crate::store::UserStore;
use crate::token::{Hs256Jwt, JwtValidator, TokenError};
use crate::user::{NewUser, User};
use crate::{Authorizer, Permission, Role};

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown username or wrong secret; the two are never distinguished.
    #[error("no active account found with the given credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub access: String,
    pub refresh: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
    pub permissions: Vec<Permission>,
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access: String,
    pub expires_in: i64,
    /// Role embedded in the new token (the subject's current role).
    pub role: Role,
}

pub struct CredentialService<S> {
    store: S,
    tokens: Arc<Hs256Jwt>,
    hasher: Arc<CredentialHasher>,
    authorizer: Authorizer,
}

impl<S> CredentialService<S>
where
    S: UserStore,
{
    pub fn new(store: S, tokens: Arc<Hs256Jwt>, hasher: Arc<CredentialHasher>, authorizer: Authorizer) -> Self {
        Self {
            store,
            tokens,
            hasher,
            authorizer,
        }
    }

    /// Authenticate `username`/`secret` and mint a token pair.
    pub fn issue(&self, username: &str, secret: &str, now: DateTime<Utc>) -> Result<IssuedCredentials, CredentialError> {
        let Some(user) = self.store.find_by_username(username.trim()) else {
            self.hasher.verify_decoy(secret);
            warn!("login rejected");
            return Err(CredentialError::InvalidCredentials);
        };

        if !self.hasher.verify(secret, &user.password_hash)? {
            warn!(user_id = %user.id, "login rejected");
            return Err(CredentialError::InvalidCredentials);
        }

        let access = self.tokens.mint(TokenKind::Access, user.id, &user.username, user.role, now)?;
        let refresh = self.tokens.mint(TokenKind::Refresh, user.id, &user.username, user.role, now)?;
        let permissions = self.authorizer.effective_permissions(user.role);

        info!(user_id = %user.id, role = %user.role, "credentials issued");
        Ok(IssuedCredentials {
            access,
            refresh,
            expires_in: self.tokens.lifetimes().access.num_seconds(),
            user,
            permissions,
        })
    }

    /// Verify an access token and return its claims.
    pub fn validate(&self, access_token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        self.tokens.validate(access_token, now).inspect_err(|e| {
            debug!(reason = %e, "access token rejected");
        })
    }

    /// Exchange a refresh token for a new access token carrying the subject's
    /// current role.
    pub fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<AccessGrant, CredentialError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh, now)
            .inspect_err(|e| debug!(reason = %e, "refresh token rejected"))?;

        let user = self
            .store
            .get(&claims.uid)
            .ok_or_else(|| TokenError::Invalid("subject no longer exists".to_string()))?;

        if user.role != claims.role {
            info!(user_id = %user.id, from = %claims.role, to = %user.role, "role changed since issuance");
        }

        let access = self.tokens.mint(TokenKind::Access, user.id, &user.username, user.role, now)?;
        Ok(AccessGrant {
            access,
            expires_in: self.tokens.lifetimes().access.num_seconds(),
            role: user.role,
        })
    }

    /// Create an account, hashing its secret.
    pub fn register(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User, CredentialError> {
        let new_user = new_user.normalized()?;
        let password_hash = self.hasher.hash(&new_user.password)?;

        let user = self
            .store
            .insert(User {
                id: UserId::new(),
                username: new_user.username,
                email: new_user.email,
                password_hash,
                role: new_user.role,
                date_joined: now,
            })
            .map_err(DomainError::from)?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Replace a user's secret.
    ///
    /// When `current` is given it must match the stored secret. Tokens issued
    /// before the change stay valid until they expire.
    pub fn change_password(&self, target: &UserId, current: Option<&str>, new_password: &str) -> Result<(), CredentialError> {
        if new_password.is_empty() {
            return Err(DomainError::validation("new_password", "password cannot be empty").into());
        }

        let user = self.store.get(target).ok_or(DomainError::NotFound)?;
        if let Some(current) = current {
            if !self.hasher.verify(current, &user.password_hash)? {
                warn!(user_id = %user.id, "password change rejected");
                return Err(CredentialError::InvalidCredentials);
            }
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.store
            .set_password_hash(target, password_hash)
            .map_err(DomainError::from)?;

        info!(user_id = %target, "password changed");
        Ok(())
    }
}

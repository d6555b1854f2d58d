//! Signed token minting and verification (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use roster_core::UserId;

use crate::claims::{JwtClaims, TokenKind, TokenValidationError, validate_claims};
use crate::Role;

/// Why a presented token was rejected.
///
/// Callers should surface both variants identically; the split exists for
/// logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// Token lifetimes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl TokenLifetimes {
    pub fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(5),
            refresh: Duration::days(1),
        }
    }
}

/// Validates bearer (access) tokens presented on protected requests.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HS256 token codec sharing one secret for signing and verification.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetimes: TokenLifetimes,
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt")
            .field("lifetimes", &self.lifetimes)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against an explicit `now`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Mint a signed token of `kind` for the given subject.
    pub fn mint(
        &self,
        kind: TokenKind,
        uid: UserId,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.lifetimes.for_kind(kind))
            .ok_or_else(|| TokenError::Signing(format!("{} token expiry out of range", kind.as_str())))?;

        let claims = JwtClaims {
            sub: username.to_string(),
            uid,
            role,
            token_type: kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::now_v7().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, token kind and time window.
    pub fn verify(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let claims = data.claims;

        if claims.token_type != kind {
            return Err(TokenError::Invalid(format!(
                "expected {} token, got {}",
                kind.as_str(),
                claims.token_type.as_str()
            )));
        }

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

impl JwtValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        self.verify(token, TokenKind::Access, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret.as_bytes(), TokenLifetimes::default())
    }

    #[test]
    fn access_token_carries_subject_role_and_expiry() {
        let jwt = codec("s3cret");
        let uid = UserId::new();
        let now = Utc::now();

        let token = jwt.mint(TokenKind::Access, uid, "alice", Role::Manager, now).unwrap();
        let claims = jwt.validate(&token, now).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.uid, uid);
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.exp - claims.iat, Duration::minutes(5).num_seconds());
    }

    #[test]
    fn refresh_token_outlives_access_token() {
        let jwt = codec("s3cret");
        let now = Utc::now();
        let token = jwt.mint(TokenKind::Refresh, UserId::new(), "bob", Role::User, now).unwrap();

        let later = now + Duration::hours(2);
        let claims = jwt.verify(&token, TokenKind::Refresh, later).unwrap();
        assert_eq!(claims.token_type, TokenKind::Refresh);
    }

    #[test]
    fn out_of_range_expiry_is_a_signing_error() {
        let lifetimes = TokenLifetimes {
            access: Duration::seconds(1_000_000_000_000_000),
            ..TokenLifetimes::default()
        };
        let jwt = Hs256Jwt::new(b"s3cret", lifetimes);

        let err = jwt
            .mint(TokenKind::Access, UserId::new(), "dave", Role::User, Utc::now())
            .unwrap_err();
        assert!(matches!(err, TokenError::Signing(_)));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let jwt = codec("s3cret");
        let now = Utc::now();
        let token = jwt.mint(TokenKind::Access, UserId::new(), "carol", Role::User, now).unwrap();

        let err = jwt.validate(&token, now + Duration::minutes(6)).unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let now = Utc::now();
        let token = codec("other")
            .mint(TokenKind::Access, UserId::new(), "mallory", Role::Admin, now)
            .unwrap();

        assert!(matches!(codec("s3cret").validate(&token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = codec("s3cret").validate("not.a.jwt", Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let jwt = codec("s3cret");
        let now = Utc::now();
        let refresh = jwt.mint(TokenKind::Refresh, UserId::new(), "dave", Role::User, now).unwrap();
        let access = jwt.mint(TokenKind::Access, UserId::new(), "dave", Role::User, now).unwrap();

        assert!(matches!(jwt.validate(&refresh, now), Err(TokenError::Invalid(_))));
        assert!(matches!(jwt.verify(&access, TokenKind::Refresh, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn debug_output_redacts_keys() {
        let rendered = format!("{:?}", codec("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("s3cret"));
    }
}

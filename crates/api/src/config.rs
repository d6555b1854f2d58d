//! Process configuration read from the environment.

use std::path::PathBuf;

use chrono::Duration;
use tracing::warn;

use roster_auth::{HashingCost, TokenLifetimes};

const DEV_SECRET: &str = "dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BOOTSTRAP_EMAIL: &str = "admin@localhost";
/// Upper bound for either token lifetime (one year).
const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Account seeded with the Admin role at start-up.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub token_lifetimes: TokenLifetimes,
    pub bind_addr: String,
    /// JSON role → permissions table; `None` uses the built-in table.
    pub role_permissions_file: Option<PathBuf>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub hashing_cost: HashingCost,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_SECRET.to_string(),
            token_lifetimes: TokenLifetimes::default(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            role_permissions_file: None,
            bootstrap_admin: None,
            hashing_cost: HashingCost::default(),
        }
    }
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_lifetimes", &self.token_lifetimes)
            .field("bind_addr", &self.bind_addr)
            .field("role_permissions_file", &self.role_permissions_file)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .field("hashing_cost", &self.hashing_cost)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source. Unset or blank keys take
    /// their defaults; unparsable numbers fall back with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_SECRET.to_string()
        });

        let token_lifetimes = TokenLifetimes {
            access: ttl_or(
                "ACCESS_TOKEN_TTL_SECS",
                get("ACCESS_TOKEN_TTL_SECS"),
                defaults.token_lifetimes.access,
            ),
            refresh: ttl_or(
                "REFRESH_TOKEN_TTL_SECS",
                get("REFRESH_TOKEN_TTL_SECS"),
                defaults.token_lifetimes.refresh,
            ),
        };

        let hashing_cost = HashingCost {
            memory_kib: parse_or(
                "PASSWORD_HASH_MEMORY_KIB",
                get("PASSWORD_HASH_MEMORY_KIB"),
                defaults.hashing_cost.memory_kib,
            ),
            iterations: parse_or(
                "PASSWORD_HASH_ITERATIONS",
                get("PASSWORD_HASH_ITERATIONS"),
                defaults.hashing_cost.iterations,
            ),
        };

        let bootstrap_admin = match (get("BOOTSTRAP_ADMIN_USERNAME"), get("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                username,
                password,
                email: get("BOOTSTRAP_ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_BOOTSTRAP_EMAIL.to_string()),
            }),
            (None, None) => None,
            _ => {
                warn!("BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together; skipping bootstrap");
                None
            }
        };

        Self {
            jwt_secret,
            token_lifetimes,
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            role_permissions_file: get("ROLE_PERMISSIONS_FILE").map(PathBuf::from),
            bootstrap_admin,
            hashing_cost,
        }
    }
}

/// Positive numeric setting, or `default` with a warning.
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: core::str::FromStr + PartialOrd + Default + core::fmt::Display + Copy,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            warn!(key, value = %raw, fallback = %default, "invalid numeric setting; using default");
            default
        }
    }
}

/// Token lifetime in seconds, capped at [`MAX_TOKEN_TTL_SECS`].
fn ttl_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let secs = parse_or(key, raw, default.num_seconds());
    if secs > MAX_TOKEN_TTL_SECS {
        warn!(key, value = secs, max = MAX_TOKEN_TTL_SECS, "token lifetime too long; using default");
        return default;
    }
    Duration::try_seconds(secs).unwrap_or(default)
}

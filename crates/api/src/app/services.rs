//! Service wiring: role table, store, token codec, hasher.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use roster_auth::{
    Authorizer, CredentialHasher, CredentialService, Hs256Jwt, JwtValidator, NewUser, Role, RolePermissionTable,
    UserStore,
};
use roster_infra::InMemoryUserStore;

use crate::config::{ApiConfig, BootstrapAdmin};

pub type SharedStore = Arc<dyn UserStore>;

/// Everything a handler needs, shared behind one `Arc`.
pub struct AppServices {
    pub store: SharedStore,
    pub authorizer: Authorizer,
    pub credentials: CredentialService<SharedStore>,
    tokens: Arc<Hs256Jwt>,
}

impl AppServices {
    /// Wire services around an already-loaded role table.
    pub fn new(config: &ApiConfig, table: RolePermissionTable) -> anyhow::Result<Self> {
        let store: SharedStore = Arc::new(InMemoryUserStore::new());
        let authorizer = Authorizer::new(Arc::new(table));
        let tokens = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes(), config.token_lifetimes));
        let hasher = Arc::new(CredentialHasher::new(config.hashing_cost).context("invalid password hashing cost")?);

        let credentials = CredentialService::new(store.clone(), tokens.clone(), hasher, authorizer.clone());

        let services = Self {
            store,
            authorizer,
            credentials,
            tokens,
        };

        if let Some(admin) = &config.bootstrap_admin {
            services.bootstrap_admin(admin)?;
        }
        Ok(services)
    }

    /// Validator used by the bearer-token middleware.
    pub fn jwt_validator(&self) -> Arc<dyn JwtValidator> {
        self.tokens.clone()
    }

    fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> anyhow::Result<()> {
        if self.store.find_by_username(&admin.username).is_some() {
            return Ok(());
        }

        let user = self
            .credentials
            .register(
                NewUser {
                    username: admin.username.clone(),
                    email: admin.email.clone(),
                    password: admin.password.clone(),
                    role: Role::Admin,
                },
                Utc::now(),
            )
            .context("failed to create bootstrap admin")?;

        info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
        Ok(())
    }
}

/// Load the configured role table (or the built-in one).
pub fn load_role_table(config: &ApiConfig) -> anyhow::Result<RolePermissionTable> {
    let Some(path) = &config.role_permissions_file else {
        return Ok(RolePermissionTable::standard());
    };

    let document = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read role permissions file {}", path.display()))?;
    let table = RolePermissionTable::from_json(&document)
        .with_context(|| format!("invalid role permissions file {}", path.display()))?;

    info!(path = %path.display(), "role permissions loaded");
    Ok(table)
}

pub fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let table = load_role_table(config)?;
    AppServices::new(config, table)
}

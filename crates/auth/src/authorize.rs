use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use roster_core::UserId;

use crate::{Permission, Role, RolePermissionTable};

/// A fully resolved, authenticated caller.
///
/// Construction is decoupled from storage and transport: the API layer
/// derives it from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    MissingPermission(Permission),

    #[error("forbidden: only the account owner or an admin may do this")]
    NotSelfOrAdmin,

    #[error("forbidden: cannot grant role '{0}' above your own")]
    RoleEscalation(Role),
}

/// Which rows a list operation may return for a given caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only the caller's own record.
    OnlySelf(UserId),
    /// The full collection.
    All,
}

/// The authorization decision engine.
///
/// Two orthogonal layers:
/// - operation level: may this role ever perform this class of action
///   ([`Authorizer::is_authorized`]);
/// - object level: may this caller act on this specific target
///   ([`Authorizer::is_self_or_admin`]).
///
/// - No IO
/// - No panics
/// - Pure over the injected table
#[derive(Debug, Clone)]
pub struct Authorizer {
    table: Arc<RolePermissionTable>,
}

impl Authorizer {
    pub fn new(table: Arc<RolePermissionTable>) -> Self {
        Self { table }
    }

    /// Operation-level decision.
    ///
    /// Admin is an unconditional bypass that does not read the table, so the
    /// Admin entry may drift without affecting the outcome. `None` means the
    /// operation declares no specific requirement.
    pub fn is_authorized(&self, role: Role, required: Option<Permission>) -> bool {
        if role.is_admin() {
            return true;
        }
        match required {
            None => true,
            Some(permission) => self.table.grants(role, permission),
        }
    }

    /// Object-level decision: Admin, or the caller is the target.
    pub fn is_self_or_admin<I>(role: Role, caller: &I, target: &I) -> bool
    where
        I: PartialEq + ?Sized,
    {
        role.is_admin() || caller == target
    }

    /// Operation-level check with failure detail.
    ///
    /// An absent principal fails before any role lookup.
    pub fn authorize(
        &self,
        caller: Option<&Principal>,
        required: Option<Permission>,
    ) -> Result<(), AuthzError> {
        let caller = caller.ok_or(AuthzError::Unauthenticated)?;
        match required {
            Some(permission) if !self.is_authorized(caller.role, required) => {
                Err(AuthzError::MissingPermission(permission))
            }
            _ => Ok(()),
        }
    }

    /// Object-level check with failure detail.
    pub fn authorize_target(&self, caller: &Principal, target: &UserId) -> Result<(), AuthzError> {
        if Self::is_self_or_admin(caller.role, &caller.user_id, target) {
            Ok(())
        } else {
            Err(AuthzError::NotSelfOrAdmin)
        }
    }

    /// Permissions reported to a caller: every permission for Admin, the table
    /// entry otherwise.
    pub fn effective_permissions(&self, role: Role) -> Vec<Permission> {
        if role.is_admin() {
            return Permission::ALL.to_vec();
        }
        self.table.permissions_for(role).iter().copied().collect()
    }

    /// Query scope for list operations, applied after the operation-level gate.
    pub fn visibility(caller: &Principal) -> Visibility {
        match caller.role {
            Role::User => Visibility::OnlySelf(caller.user_id),
            Role::Admin | Role::Manager => Visibility::All,
        }
    }

    /// Whether `caller` may hand out `role` when creating an account.
    ///
    /// Admin may grant anything; everyone else may grant at most their own rank.
    pub fn may_grant_role(caller: Role, role: Role) -> Result<(), AuthzError> {
        if caller.is_admin() || role.rank() <= caller.rank() {
            Ok(())
        } else {
            Err(AuthzError::RoleEscalation(role))
        }
    }
}

//! Role mutation.
//!
//! The caller's `manage_roles` permission is checked by the request gate
//! before this runs; there is no object-level check. Outstanding access
//! tokens for the target keep their old role until refreshed or expired.

use tracing::info;

use roster_core::{DomainError, DomainResult, UserId};

use crate::store::UserStore;
use crate::user::User;
use crate::Role;

/// Confirmation of a persisted role change.
#[derive(Debug, Clone)]
pub struct RoleChange {
    pub user: User,
    pub previous: Role,
}

/// Set `target`'s role to the role named `requested`.
///
/// Fails with `NotFound` when the target does not exist, then with a
/// validation error on `role` when the name is not a recognized role. The
/// stored row is untouched on either failure.
pub fn change_role<S>(store: &S, target: &UserId, requested: &str) -> DomainResult<RoleChange>
where
    S: UserStore + ?Sized,
{
    let current = store.get(target).ok_or(DomainError::NotFound)?;

    let role: Role = requested
        .parse()
        .map_err(|e: crate::roles::UnknownRole| DomainError::validation("role", e.to_string()))?;

    let user = store.set_role(target, role)?;
    info!(user_id = %target, from = %current.role, to = %role, "role changed");

    Ok(RoleChange {
        user,
        previous: current.role,
    })
}

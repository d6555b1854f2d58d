//! Request gate: per-operation authorization policies.
//!
//! Every protected handler names its policy constant and calls
//! [`authorize_operation`] before touching the store, so a denied request has
//! no side effects.

use tracing::warn;

use roster_auth::{Authorizer, AuthzError, Permission, Visibility};
use roster_core::UserId;

use crate::context::PrincipalContext;

/// Object-level requirement layered on top of the operation permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectCheck {
    /// Operation-level permission only.
    None,
    /// The caller must be an Admin or the path-addressed target.
    SelfOrAdmin,
    /// List scoping: a caller whose visibility is self-only may still read
    /// their own row without the operation permission.
    Scoped,
}

/// Static authorization contract of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPolicy {
    pub name: &'static str,
    pub required: Option<Permission>,
    pub object: ObjectCheck,
}

pub const WHOAMI: OperationPolicy = OperationPolicy {
    name: "whoami",
    required: None,
    object: ObjectCheck::None,
};

pub const LIST_USERS: OperationPolicy = OperationPolicy {
    name: "list_users",
    required: Some(Permission::ViewUsers),
    object: ObjectCheck::Scoped,
};

pub const CREATE_USER: OperationPolicy = OperationPolicy {
    name: "create_user",
    required: Some(Permission::CreateUsers),
    object: ObjectCheck::None,
};

pub const RETRIEVE_USER: OperationPolicy = OperationPolicy {
    name: "retrieve_user",
    required: Some(Permission::UpdateUsers),
    object: ObjectCheck::None,
};

pub const UPDATE_USER: OperationPolicy = OperationPolicy {
    name: "update_user",
    required: Some(Permission::UpdateUsers),
    object: ObjectCheck::None,
};

pub const DELETE_USER: OperationPolicy = OperationPolicy {
    name: "delete_user",
    required: Some(Permission::DeleteUsers),
    object: ObjectCheck::None,
};

/// Role changes are operation-level only: an Admin may change any account.
pub const CHANGE_ROLE: OperationPolicy = OperationPolicy {
    name: "change_role",
    required: Some(Permission::ManageRoles),
    object: ObjectCheck::None,
};

pub const CHANGE_PASSWORD: OperationPolicy = OperationPolicy {
    name: "change_password",
    required: None,
    object: ObjectCheck::SelfOrAdmin,
};

/// Check a request against `policy`.
///
/// `target` is the path-addressed account for object-checked operations. On
/// success, returns the row scope the handler must apply (always
/// [`Visibility::All`] for non-list operations).
pub fn authorize_operation(
    authorizer: &Authorizer,
    caller: Option<&PrincipalContext>,
    policy: &OperationPolicy,
    target: Option<&UserId>,
) -> Result<Visibility, AuthzError> {
    let principal = caller.map(PrincipalContext::principal);
    let operation = authorizer.authorize(principal, policy.required);

    let result = match (operation, principal) {
        (Err(AuthzError::Unauthenticated), _) | (_, None) => Err(AuthzError::Unauthenticated),
        (Ok(()), Some(principal)) => match policy.object {
            ObjectCheck::None => Ok(Visibility::All),
            ObjectCheck::Scoped => Ok(Authorizer::visibility(principal)),
            ObjectCheck::SelfOrAdmin => match target {
                Some(target) => authorizer.authorize_target(principal, target).map(|()| Visibility::All),
                None => Err(AuthzError::NotSelfOrAdmin),
            },
        },
        (Err(denied), Some(principal)) => match (policy.object, Authorizer::visibility(principal)) {
            (ObjectCheck::Scoped, scope @ Visibility::OnlySelf(_)) => Ok(scope),
            _ => Err(denied),
        },
    };

    if let (Err(e), Some(principal)) = (&result, principal) {
        warn!(
            operation = policy.name,
            user_id = %principal.user_id,
            role = %principal.role,
            reason = %e,
            "request denied"
        );
    }
    result
}

//! User administration routes.
//!
//! Every handler runs the request gate for its policy before touching the
//! store, so a denied request leaves no trace.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

use roster_auth::{change_role, Authorizer, NewUser, ProfileUpdate, Role, UnknownRole, UserProfile, Visibility};
use roster_core::{DomainError, UserId};

use crate::app::dto::{
    ChangePasswordRequest, ChangeRoleRequest, CreateUserRequest, RoleChangeResponse, UpdateUserRequest,
};
use crate::app::errors::ApiError;
use crate::app::routes::blocking;
use crate::app::services::AppServices;
use crate::authz::{self, authorize_operation};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(retrieve_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/users/:id/role", put(change_user_role))
        .route("/users/:id/password", put(change_password))
}

fn parse_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse::<UserId>().map_err(ApiError::from)
}

/// GET /users - All users, or only the caller's own row for role User.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let scope = authorize_operation(&services.authorizer, Some(&principal), &authz::LIST_USERS, None)?;

    let users = match scope {
        Visibility::All => services.store.list(),
        Visibility::OnlySelf(id) => services.store.get(&id).into_iter().collect(),
    };

    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

/// POST /users - Create an account with an explicit role.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    authorize_operation(&services.authorizer, Some(&principal), &authz::CREATE_USER, None)?;
    let Json(body) = payload?;

    let role = match body.role.as_deref() {
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e: UnknownRole| ApiError::validation("role", e.to_string()))?,
        None => Role::User,
    };

    // Privilege escalation check: only an Admin may hand out a role above its own.
    Authorizer::may_grant_role(principal.role(), role)?;

    let new_user = NewUser {
        username: body.username,
        email: body.email,
        password: body.password,
        role,
    };
    let creator = principal.user_id();
    let user = blocking(move || Ok(services.credentials.register(new_user, Utc::now())?)).await?;

    info!(user_id = %user.id, created_by = %creator, role = %user.role, "user created");
    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// GET /users/:id - Fetch one account for editing.
pub async fn retrieve_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    authorize_operation(&services.authorizer, Some(&principal), &authz::RETRIEVE_USER, None)?;
    let id = parse_id(&id)?;

    let user = services.store.get(&id).ok_or(DomainError::NotFound)?;
    Ok(Json(user.profile()))
}

/// PUT|PATCH /users/:id - Change username and/or email. Never the role.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    authorize_operation(&services.authorizer, Some(&principal), &authz::UPDATE_USER, None)?;
    let id = parse_id(&id)?;
    let Json(body) = payload?;

    let update = ProfileUpdate {
        username: body.username,
        email: body.email,
    }
    .normalized()?;
    if update.is_empty() {
        return Err(ApiError::Validation {
            field: None,
            message: "nothing to update (expected username and/or email)".to_string(),
        });
    }

    let user = services.store.update_profile(&id, update).map_err(DomainError::from)?;

    info!(user_id = %user.id, updated_by = %principal.user_id(), "user updated");
    Ok(Json(user.profile()))
}

/// DELETE /users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize_operation(&services.authorizer, Some(&principal), &authz::DELETE_USER, None)?;
    let id = parse_id(&id)?;

    services.store.delete(&id).map_err(DomainError::from)?;

    info!(user_id = %id, deleted_by = %principal.user_id(), "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/:id/role - Assign a new role.
pub async fn change_user_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> Result<Json<RoleChangeResponse>, ApiError> {
    authorize_operation(&services.authorizer, Some(&principal), &authz::CHANGE_ROLE, None)?;
    let id = parse_id(&id)?;
    // An unknown target is a 404 whatever the body looks like.
    if services.store.get(&id).is_none() {
        return Err(DomainError::NotFound.into());
    }
    let Json(body) = payload?;

    let change = change_role(services.store.as_ref(), &id, &body.role)?;

    Ok(Json(change.into()))
}

/// PUT /users/:id/password - Owner (with current password) or Admin.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    authorize_operation(&services.authorizer, Some(&principal), &authz::CHANGE_PASSWORD, Some(&id))?;
    let Json(body) = payload?;

    // Acting on your own account always needs the current secret, Admin or not.
    let current = if principal.user_id() == id {
        let current = body
            .current_password
            .ok_or_else(|| ApiError::validation("current_password", "current password is required"))?;
        Some(current)
    } else {
        None
    };

    blocking(move || {
        services
            .credentials
            .change_password(&id, current.as_deref(), &body.new_password)?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

//! Public credential endpoints: register, login, refresh.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use roster_auth::{NewUser, Role, UnknownRole, UserProfile};

use crate::app::dto::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::routes::blocking;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/token/refresh", post(refresh))
}

/// POST /auth/register - Self-service sign-up; always creates role User.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let Json(body) = payload?;

    if let Some(requested) = body.role.as_deref() {
        let role: Role = requested
            .parse()
            .map_err(|e: UnknownRole| ApiError::validation("role", e.to_string()))?;
        if role != Role::User {
            return Err(ApiError::validation("role", "public registration always creates role User"));
        }
    }

    let new_user = NewUser {
        username: body.username,
        email: body.email,
        password: body.password,
        role: Role::User,
    };
    let user = blocking(move || Ok(services.credentials.register(new_user, Utc::now())?)).await?;

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// POST /auth/login - Exchange username/password for a token pair.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;

    let issued = blocking(move || Ok(services.credentials.issue(&body.username, &body.password, Utc::now())?)).await?;

    Ok(Json(issued.into()))
}

/// POST /auth/token/refresh - Mint a new access token with the current role.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let Json(body) = payload?;

    let grant = services.credentials.refresh(&body.refresh, Utc::now())?;

    Ok(Json(grant.into()))
}

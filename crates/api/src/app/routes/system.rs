use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::{dto::WhoAmIResponse, errors::ApiError, services::AppServices};
use crate::authz::{self, authorize_operation};
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Echo the identity carried by the presented access token.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<WhoAmIResponse>, ApiError> {
    authorize_operation(&services.authorizer, Some(&principal), &authz::WHOAMI, None)?;

    Ok(Json(WhoAmIResponse {
        user_id: principal.user_id(),
        username: principal.username().to_string(),
        role: principal.role(),
        permissions: services.authorizer.effective_permissions(principal.role()),
        expires_at: principal.expires_at().map(|t| t.to_rfc3339()),
    }))
}

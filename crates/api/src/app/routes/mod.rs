use axum::{routing::get, Router};

use crate::app::errors::ApiError;

pub mod auth;
pub mod system;
pub mod users;

/// Unauthenticated endpoints (registration and token exchange).
pub fn public_router() -> Router {
    Router::new().nest("/auth", auth::router())
}

/// Router for all bearer-authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(users::router())
}

/// Run password hashing off the async workers.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
}

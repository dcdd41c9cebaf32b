use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

use super::auth::AuthUser;

/// The stored record of the administrator making the request
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

/// Authorization gate: must run after `authenticate`.
///
/// The role is read from the store on every request; a token issued before a
/// demotion or deletion grants nothing.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthenticated("Authentication required"))?;

    let user = state.store.find_user(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!("Admin check failed: user {} no longer exists", auth_user.user_id);
        ApiError::forbidden("Access denied")
    })?;

    if !user.role.is_admin() {
        tracing::warn!("Admin check failed: user {} has role {}", user.id, user.role);
        return Err(ApiError::forbidden("Access denied: admins only"));
    }

    tracing::debug!("Admin access granted to {}", user.id);
    request.extensions_mut().insert(AdminUser(user));

    Ok(next.run(request).await)
}

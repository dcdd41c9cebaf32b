// handlers/elevated/admin/users.rs - /admin/users handlers

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::database::models::PublicUser;
use crate::handlers::parse_id;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "User not found";

/// GET /admin/users - List every account (password hashes never leave the store layer)
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<PublicUser>> {
    let users = state.admin().list_users().await?;
    Ok(ApiResponse::success(users))
}

/// PUT /admin/users/:id/role - Change a user's role
///
/// Expected Input:
/// ```json
/// { "role": "admin" }
/// ```
///
/// Demoting the only remaining admin is refused with 403.
pub async fn user_role_put(
    State(state): State<AppState>,
    Extension(AdminUser(actor)): Extension<AdminUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let target = parse_id(&id, USER_NOT_FOUND)?;
    let Json(body) = payload?;
    let requested = body.get("role").cloned().unwrap_or(Value::Null);

    tracing::info!("Admin {} requested role {} for user {}", actor.id, requested, target);
    let user = state.admin().change_role(target, &requested).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /admin/users/:id - Edit profile fields (name, email, password)
///
/// A `role` key is rejected; roles only change through the role route.
pub async fn user_put(
    State(state): State<AppState>,
    Extension(AdminUser(actor)): Extension<AdminUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let target = parse_id(&id, USER_NOT_FOUND)?;
    let Json(body) = payload?;

    tracing::info!("Admin {} editing profile of user {}", actor.id, target);
    let user = state.admin().edit_profile(target, body).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /admin/users/:id - Remove an account
///
/// Records owned by the account are kept.
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(AdminUser(actor)): Extension<AdminUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let target = parse_id(&id, USER_NOT_FOUND)?;

    tracing::info!("Admin {} deleting user {}", actor.id, target);
    state.admin().delete_user(target).await?;
    Ok(ApiResponse::success(json!({ "message": "User deleted successfully" })))
}

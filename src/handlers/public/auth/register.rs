// handlers/public/auth/register.rs - POST /auth/register handler

use axum::extract::{rejection::JsonRejection, Json, State};

use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RegisterRequest;
use crate::state::AppState;

/// POST /auth/register - Create a new account
///
/// New accounts always receive the `user` role; a `role` field in the body is
/// ignored.
///
/// Expected Input:
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "password": "secret" }
/// ```
///
/// Expected Output (201):
/// ```json
/// {
///   "success": true,
///   "data": { "id": "uuid", "name": "Ada", "email": "ada@example.com", "role": "user", ... }
/// }
/// ```
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let Json(request) = payload?;
    let user = state.accounts().register(request).await?;
    Ok(ApiResponse::created(user))
}

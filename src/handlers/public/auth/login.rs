// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::{rejection::JsonRejection, Json, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, LoginResponse};
use crate::state::AppState;

/// POST /auth/login - Authenticate and receive a JWT
///
/// Unknown email and wrong password produce the same 401 response.
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "secret" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expiresIn": 86400,
///     "user": { "id": "uuid", "email": "ada@example.com", "role": "user", ... }
///   }
/// }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let response = state.accounts().login(request).await?;
    Ok(ApiResponse::success(response))
}

// handlers/protected/finance/submit.rs - POST /finance/submit handler

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    Extension,
};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{SubmitRequest, SubmitResponse};
use crate::state::AppState;

/// POST /finance/submit - Compute totals and store a record owned by the caller
///
/// Expected Input:
/// ```json
/// { "inputData": { "unitsSold": 10, "pricePerUnit": 5, "cost": 20 } }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": { "calculatedResult": { "totalRevenue": 50, "profit": 30 } }
/// }
/// ```
pub async fn submit_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<SubmitResponse> {
    let Json(request) = payload?;
    let response = state.finance().submit(auth_user.user_id, request).await?;
    Ok(ApiResponse::success(response))
}

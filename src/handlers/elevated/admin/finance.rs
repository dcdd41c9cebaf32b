// handlers/elevated/admin/finance.rs - /admin/finance/financial-inputs handlers

use axum::extract::{rejection::JsonRejection, Json, Path, State};
use serde_json::{json, Value};

use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RecordUpdateResponse;
use crate::state::AppState;

/// GET /admin/finance/financial-inputs - Every record with its owner's name and email
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "financialRecords": [
///       {
///         "id": "uuid",
///         "userId": "uuid",
///         "inputData": { "unitsSold": 10, "pricePerUnit": 5, "cost": 20 },
///         "calculatedResult": { "totalRevenue": 50, "profit": 30 },
///         "createdAt": "2024-06-01T00:00:00Z",
///         "user": { "id": "uuid", "name": "Ada", "email": "ada@example.com" }
///       }
///     ]
///   }
/// }
/// ```
pub async fn financial_inputs_get(State(state): State<AppState>) -> ApiResult<Value> {
    let records = state.admin().list_records().await?;
    Ok(ApiResponse::success(json!({ "financialRecords": records })))
}

/// PUT /admin/finance/financial-inputs/:id - Replace input and/or result figures
///
/// Expected Input (either part may be omitted):
/// ```json
/// {
///   "inputData": { "unitsSold": 12, "pricePerUnit": 5, "cost": 20 },
///   "calculatedResult": { "totalRevenue": 60, "profit": 40 }
/// }
/// ```
pub async fn financial_inputs_put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<RecordUpdateResponse> {
    let id = parse_id(&id, "Financial input not found")?;
    let Json(body) = payload?;
    let response = state.admin().update_record(id, body).await?;
    Ok(ApiResponse::success(response))
}

/// DELETE /admin/finance/financial-inputs/:id
pub async fn financial_inputs_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id, "Record not found")?;
    state.admin().delete_record(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Record deleted successfully" })))
}

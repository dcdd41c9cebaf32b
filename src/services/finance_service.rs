use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{CalculatedResult, NewFinancialInput};
use crate::database::Store;
use crate::services::calculation::perform_calculations;
use crate::services::payload::InputDataPayload;
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub input_data: Option<InputDataPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub calculated_result: CalculatedResult,
}

/// Owner-facing submission of financial figures
pub struct FinanceService {
    store: Arc<dyn Store>,
}

impl FinanceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Compute totals and persist a record owned by `owner`
    pub async fn submit(&self, owner: Uuid, request: SubmitRequest) -> ServiceResult<SubmitResponse> {
        let Some(payload) = request.input_data else {
            let mut field_errors = HashMap::new();
            field_errors.insert("inputData".to_string(), "This field is required".to_string());
            return Err(ServiceError::validation("Missing required fields", field_errors));
        };

        let input_data = payload.into_input_data()?;
        let calculated_result = perform_calculations(&input_data);

        let record = self
            .store
            .insert_record(NewFinancialInput {
                user_id: owner,
                input_data,
                calculated_result,
            })
            .await?;

        tracing::info!("Financial input {} submitted by user {}", record.id, owner);

        Ok(SubmitResponse { calculated_result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn submit_persists_owned_record() {
        let store = Arc::new(MemoryStore::new());
        let service = FinanceService::new(store.clone());
        let owner = Uuid::new_v4();

        let request: SubmitRequest = serde_json::from_value(json!({
            "inputData": {"unitsSold": "10", "pricePerUnit": "5", "cost": "20"}
        }))
        .unwrap();
        let response = service.submit(owner, request).await.unwrap();

        assert_eq!(response.calculated_result, CalculatedResult { total_revenue: 50.0, profit: 30.0 });
        let records = store.list_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.user_id, owner);
        assert_eq!(records[0].record.calculated_result.profit, 30.0);
    }

    #[tokio::test]
    async fn missing_input_data_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let service = FinanceService::new(store.clone());

        let err = service.submit(Uuid::new_v4(), SubmitRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        assert!(store.list_records().await.unwrap().is_empty());
    }
}

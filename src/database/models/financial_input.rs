use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw figures entered by the owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputData {
    pub units_sold: f64,
    pub price_per_unit: f64,
    pub cost: f64,
}

/// Derived totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedResult {
    pub total_revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInput {
    pub id: Uuid,
    pub user_id: Uuid,
    pub input_data: InputData,
    pub calculated_result: CalculatedResult,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFinancialInput {
    pub user_id: Uuid,
    pub input_data: InputData,
    pub calculated_result: CalculatedResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Record joined with its owner; `user` is `None` once the owner is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputWithOwner {
    #[serde(flatten)]
    pub record: FinancialInput,
    pub user: Option<OwnerSummary>,
}

/// Admin edit: each supplied part replaces the stored value wholesale.
/// The owner is not part of the patch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordPatch {
    pub input_data: Option<InputData>,
    pub calculated_result: Option<CalculatedResult>,
}

impl FinancialInput {
    pub fn apply(&self, patch: &RecordPatch) -> FinancialInput {
        FinancialInput {
            input_data: patch.input_data.unwrap_or(self.input_data),
            calculated_result: patch.calculated_result.unwrap_or(self.calculated_result),
            ..self.clone()
        }
    }
}

/// `financial_inputs` LEFT JOIN `users`
#[derive(Debug, Clone, FromRow)]
pub struct FinancialInputRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub units_sold: f64,
    pub price_per_unit: f64,
    pub cost: f64,
    pub total_revenue: f64,
    pub profit: f64,
    pub created_at: DateTime<Utc>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

impl From<FinancialInputRow> for FinancialInputWithOwner {
    fn from(row: FinancialInputRow) -> Self {
        let user = match (row.owner_name, row.owner_email) {
            (Some(name), Some(email)) => Some(OwnerSummary {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };

        FinancialInputWithOwner {
            record: FinancialInput {
                id: row.id,
                user_id: row.user_id,
                input_data: InputData {
                    units_sold: row.units_sold,
                    price_per_unit: row.price_per_unit,
                    cost: row.cost,
                },
                calculated_result: CalculatedResult {
                    total_revenue: row.total_revenue,
                    profit: row.profit,
                },
                created_at: row.created_at,
            },
            user,
        }
    }
}

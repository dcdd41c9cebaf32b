//! Wire shapes for financial figures.
//!
//! The browser form posts numbers as strings (`"10"`), admin edits post real
//! numbers; both are accepted. Missing, empty and non-numeric values are
//! reported per field.

use serde::Deserialize;
use std::collections::HashMap;

use crate::database::models::{CalculatedResult, InputData};
use crate::services::ServiceError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn parse(&self) -> Result<Option<f64>, &'static str> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) if s.trim().is_empty() => return Ok(None),
            Numeric::Text(s) => s.trim().parse::<f64>().map_err(|_| "Must be a number")?,
        };
        if !value.is_finite() {
            return Err("Must be a finite number");
        }
        Ok(Some(value))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDataPayload {
    pub units_sold: Option<Numeric>,
    pub price_per_unit: Option<Numeric>,
    pub cost: Option<Numeric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedResultPayload {
    pub total_revenue: Option<Numeric>,
    pub profit: Option<Numeric>,
}

fn required_number(
    prefix: &str,
    field: &str,
    value: Option<&Numeric>,
    errors: &mut HashMap<String, String>,
) -> f64 {
    let key = format!("{}.{}", prefix, field);
    match value.map(Numeric::parse) {
        Some(Ok(Some(n))) => n,
        Some(Err(msg)) => {
            errors.insert(key, msg.to_string());
            0.0
        }
        None | Some(Ok(None)) => {
            errors.insert(key, "This field is required".to_string());
            0.0
        }
    }
}

impl InputDataPayload {
    pub fn into_input_data(self) -> Result<InputData, ServiceError> {
        let mut errors = HashMap::new();
        let units_sold = required_number("inputData", "unitsSold", self.units_sold.as_ref(), &mut errors);
        let price_per_unit =
            required_number("inputData", "pricePerUnit", self.price_per_unit.as_ref(), &mut errors);
        let cost = required_number("inputData", "cost", self.cost.as_ref(), &mut errors);

        if !errors.is_empty() {
            return Err(ServiceError::validation("Missing or invalid input fields", errors));
        }
        Ok(InputData {
            units_sold,
            price_per_unit,
            cost,
        })
    }
}

impl CalculatedResultPayload {
    pub fn into_calculated_result(self) -> Result<CalculatedResult, ServiceError> {
        let mut errors = HashMap::new();
        let total_revenue = required_number(
            "calculatedResult",
            "totalRevenue",
            self.total_revenue.as_ref(),
            &mut errors,
        );
        let profit = required_number("calculatedResult", "profit", self.profit.as_ref(), &mut errors);

        if !errors.is_empty() {
            return Err(ServiceError::validation("Missing or invalid result fields", errors));
        }
        Ok(CalculatedResult { total_revenue, profit })
    }
}

/// Admin edits must carry sensible figures: positive units and price,
/// non-negative cost.
pub fn validate_edited_input(input: &InputData) -> Result<(), ServiceError> {
    let mut errors = HashMap::new();
    if input.units_sold <= 0.0 {
        errors.insert("inputData.unitsSold".to_string(), "Must be greater than zero".to_string());
    }
    if input.price_per_unit <= 0.0 {
        errors.insert("inputData.pricePerUnit".to_string(), "Must be greater than zero".to_string());
    }
    if input.cost < 0.0 {
        errors.insert("inputData.cost".to_string(), "Cannot be negative".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::validation(
            "Units Sold and Price per Unit must be positive numbers. Cost cannot be negative.",
            errors,
        ))
    }
}

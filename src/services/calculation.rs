use crate::database::models::{CalculatedResult, InputData};

/// Derive revenue and profit from raw figures.
///
/// Pure and unrounded; sign checks belong to the caller.
pub fn perform_calculations(input: &InputData) -> CalculatedResult {
    let total_revenue = input.units_sold * input.price_per_unit;
    let profit = total_revenue - input.cost;

    CalculatedResult { total_revenue, profit }
}

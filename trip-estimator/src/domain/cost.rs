//! Cost estimate types.

use serde::Serialize;

/// Currency the estimate is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    /// ISO 4217 code
    pub code: String,
    pub symbol: String,
    pub name: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            code: "BRL".to_string(),
            symbol: "R$".to_string(),
            name: "Brazilian Real".to_string(),
        }
    }
}

/// Inputs and constants that went into an estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComponents {
    /// Fixed rate
    pub base_cost: f64,
    /// Cost per hour of travel
    pub time_cost: f64,
    /// Traffic weight applied to fuel cost, in [0.1, 2.0], two decimals
    pub traffic_adjustment: f64,
    /// Price per unit of fuel
    pub fuel_price: f64,
    /// Kilometers per unit of fuel
    pub fuel_consumption: f64,
}

/// Total estimated trip cost with its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub estimated_cost: f64,
    pub currency: Currency,
    pub cost_details: CostComponents,
    /// Where the fuel price came from
    pub source_url: String,
}

//! Trip cost estimation.
//!
//! The formula itself ([`estimate_cost`]) is pure. [`CostEstimator`] pairs
//! it with a [`FuelPriceFetcher`] so the fuel price can be looked up for
//! the configured state.

mod estimator;
mod fuel;

pub use estimator::{
    BASE_COST, CostError, CostEstimator, FUEL_EFFICIENCY, MAX_TRAFFIC_WEIGHT, MIN_TRAFFIC_WEIGHT,
    TIME_FACTOR, TrafficWeight, estimate_cost,
};
pub use fuel::{
    DEFAULT_BASE_URL, DEFAULT_STATE, FuelPriceClient, FuelPriceFetcher, parse_fuel_price,
};

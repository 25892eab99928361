//! Trip cost formula and the cost estimator.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::domain::{CostComponents, CostEstimate, Currency, TrafficLevel, UnknownTrafficCondition};
use crate::upstream::ProviderError;

use super::fuel::{FuelPriceFetcher, parse_fuel_price};

/// Fixed rate added to every trip.
pub const BASE_COST: f64 = 5.0;

/// Cost per hour of travel.
pub const TIME_FACTOR: f64 = 0.5;

/// Kilometers per unit of fuel.
pub const FUEL_EFFICIENCY: f64 = 10.0;

/// Smallest accepted numeric traffic weight.
pub const MIN_TRAFFIC_WEIGHT: f64 = 0.1;

/// Largest accepted numeric traffic weight.
pub const MAX_TRAFFIC_WEIGHT: f64 = 2.0;

/// Errors from cost estimation.
#[derive(Debug, thiserror::Error)]
pub enum CostError {
    /// A numeric input is outside its valid range
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// A traffic condition name is not recognised
    #[error(transparent)]
    UnknownTrafficCondition(#[from] UnknownTrafficCondition),

    /// The fuel price could not be obtained
    #[error("fuel price: {0}")]
    FuelPrice(#[from] ProviderError),
}

/// Multiplier applied to fuel cost for congestion.
///
/// Always within [0.1, 2.0] with at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TrafficWeight(f64);

impl TrafficWeight {
    /// Weight for a traffic level: light 1.0, moderate 1.2, heavy 1.5.
    pub fn from_level(level: TrafficLevel) -> Self {
        match level {
            TrafficLevel::Light => TrafficWeight(1.0),
            TrafficLevel::Moderate => TrafficWeight(1.2),
            TrafficLevel::Heavy => TrafficWeight(1.5),
        }
    }

    /// An explicit weight, rounded to two decimals.
    ///
    /// # Errors
    ///
    /// [`CostError::InvalidInput`] unless `value` is within [0.1, 2.0].
    pub fn new(value: f64) -> Result<Self, CostError> {
        if !(MIN_TRAFFIC_WEIGHT..=MAX_TRAFFIC_WEIGHT).contains(&value) {
            return Err(CostError::InvalidInput {
                field: "traffic_weight",
                value,
            });
        }
        Ok(TrafficWeight((value * 100.0).round() / 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for TrafficWeight {
    fn default() -> Self {
        Self::from_level(TrafficLevel::Light)
    }
}

impl From<TrafficLevel> for TrafficWeight {
    fn from(level: TrafficLevel) -> Self {
        Self::from_level(level)
    }
}

impl FromStr for TrafficWeight {
    type Err = UnknownTrafficCondition;

    /// Parse a level name (`light`, `moderate`, `heavy`), any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<TrafficLevel>().map(Self::from_level)
    }
}

impl fmt::Display for TrafficWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Total trip cost.
///
/// ```text
/// fuel_cost  = (distance_km / FUEL_EFFICIENCY) * fuel_price * weight
/// total_cost = BASE_COST + fuel_cost + (minutes / 60) * TIME_FACTOR
/// ```
///
/// `distance` is in meters.
///
/// # Errors
///
/// [`CostError::InvalidInput`] if distance, time or fuel price is not
/// strictly positive.
///
/// # Example
///
/// ```
/// use trip_estimator::cost::{TrafficWeight, estimate_cost};
///
/// let total = estimate_cost(10_000.0, 20.0, TrafficWeight::default(), 5.55).unwrap();
/// assert!((total - 10.72).abs() < 0.01);
/// ```
pub fn estimate_cost(
    distance: f64,
    minutes: f64,
    weight: TrafficWeight,
    fuel_price: f64,
) -> Result<f64, CostError> {
    check_positive("distance", distance)?;
    check_positive("time_estimated", minutes)?;
    check_positive("fuel_price", fuel_price)?;

    let distance_km = distance / 1000.0;
    let fuel_cost = (distance_km / FUEL_EFFICIENCY) * fuel_price * weight.value();
    Ok(BASE_COST + fuel_cost + (minutes / 60.0) * TIME_FACTOR)
}

fn check_positive(field: &'static str, value: f64) -> Result<(), CostError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CostError::InvalidInput { field, value })
    }
}

/// Estimates trip cost using the current fuel price for one state.
#[derive(Debug, Clone)]
pub struct CostEstimator<F> {
    fetcher: F,
    state: String,
    currency: Currency,
}

impl<F: FuelPriceFetcher> CostEstimator<F> {
    pub fn new(fetcher: F, state: impl Into<String>) -> Self {
        Self {
            fetcher,
            state: state.into(),
            currency: Currency::default(),
        }
    }

    /// Set the currency reported on estimates.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Fetch the fuel price and estimate the cost of a trip.
    ///
    /// Inputs are checked before the fuel price is fetched.
    pub async fn estimate(
        &self,
        distance: f64,
        minutes: f64,
        weight: TrafficWeight,
    ) -> Result<CostEstimate, CostError> {
        check_positive("distance", distance)?;
        check_positive("time_estimated", minutes)?;

        let body = self.fetcher.fetch_fuel_price(&self.state).await?;
        let fuel_price = parse_fuel_price(&body)?;
        debug!(state = %self.state, fuel_price, "parsed fuel price");

        let estimated_cost = estimate_cost(distance, minutes, weight, fuel_price)?;
        info!(estimated_cost, %weight, state = %self.state, "estimated cost");

        Ok(CostEstimate {
            estimated_cost,
            currency: self.currency.clone(),
            cost_details: CostComponents {
                base_cost: BASE_COST,
                time_cost: TIME_FACTOR,
                traffic_adjustment: weight.value(),
                fuel_price,
                fuel_consumption: FUEL_EFFICIENCY,
            },
            source_url: self.fetcher.source_url(&self.state),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Accepted weights stay in range with at most two decimals
        #[test]
        fn weight_rounded_in_range(value in MIN_TRAFFIC_WEIGHT..=MAX_TRAFFIC_WEIGHT) {
            let weight = TrafficWeight::new(value).unwrap().value();
            prop_assert!((MIN_TRAFFIC_WEIGHT..=MAX_TRAFFIC_WEIGHT).contains(&weight));
            prop_assert!((weight * 100.0 - (weight * 100.0).round()).abs() < 1e-9);
        }

        /// Cost never drops below the base and grows with distance
        #[test]
        fn cost_monotonic_in_distance(
            distance in 1.0f64..1_000_000.0,
            extra in 1.0f64..100_000.0,
            minutes in 1.0f64..1_000.0,
            price in 0.5f64..20.0,
        ) {
            let weight = TrafficWeight::default();
            let near = estimate_cost(distance, minutes, weight, price).unwrap();
            let far = estimate_cost(distance + extra, minutes, weight, price).unwrap();
            prop_assert!(near > BASE_COST);
            prop_assert!(far > near);
        }

        /// Heavier traffic never makes a trip cheaper
        #[test]
        fn heavier_traffic_costs_more(distance in 1.0f64..500_000.0, minutes in 1.0f64..600.0) {
            let light = estimate_cost(distance, minutes, TrafficLevel::Light.into(), 5.0).unwrap();
            let heavy = estimate_cost(distance, minutes, TrafficLevel::Heavy.into(), 5.0).unwrap();
            prop_assert!(heavy >= light);
        }
    }
}

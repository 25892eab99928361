//! Itinerary planning errors.

use std::fmt;

use serde::Serialize;

use crate::cost::CostError;
use crate::domain::DomainError;
use crate::upstream::ProviderError;

/// Pipeline stage at which planning failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    StartPlace,
    EndPlace,
    Route,
    Traffic,
    Cost,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::StartPlace => "start_place",
            Stage::EndPlace => "end_place",
            Stage::Route => "route",
            Stage::Traffic => "traffic",
            Stage::Cost => "cost",
        }
    }

    /// User-facing name of the failing step.
    pub fn category(self) -> &'static str {
        match self {
            Stage::StartPlace | Stage::EndPlace => "place resolution",
            Stage::Route => "route lookup",
            Stage::Traffic => "traffic lookup",
            Stage::Cost => "cost estimation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong inside a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Cost(#[from] CostError),

    #[error("validation failed: {0}")]
    Validation(#[from] DomainError),
}

/// Planning failure: the stage that failed and why.
#[derive(Debug, thiserror::Error)]
#[error("{} ({stage}) failed: {source}", stage.category())]
pub struct ItineraryError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl ItineraryError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// A provider could not be reached or refused the request.
    pub fn is_upstream_unavailable(&self) -> bool {
        match &self.source {
            StageError::Provider(e) | StageError::Cost(CostError::FuelPrice(e)) => {
                e.is_unavailable()
            }
            _ => false,
        }
    }
}

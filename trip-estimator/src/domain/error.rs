//! Domain error types.
//!
//! These errors represent entity invariant violations in the domain layer.
//! They are distinct from provider/IO errors and from request parsing errors.

/// Domain-level errors raised when an entity would violate its invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A number outside its valid range
    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },

    /// A value that must be strictly positive was zero, negative or NaN
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A value that must not be negative was negative or NaN
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// A required text field was empty or blank
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A route's endpoints coincide
    #[error("origin and destination must be different")]
    SameEndpoints,

    /// A requested time lies in the past
    #[error("{0} cannot be in the past")]
    TimeInPast(&'static str),

    /// The requested arrival is not after the requested departure
    #[error("arrive_by must be later than depart_at")]
    ArrivalNotAfterDeparture,

    /// Departure plus travel time does not fit in a timestamp
    #[error("arrival time out of range for a {duration} minute trip")]
    ArrivalOutOfRange { duration: f64 },
}

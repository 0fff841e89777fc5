//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from ingestion and IO errors.

use super::PlaceId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Route has no legs
    #[error("route must have at least one leg")]
    EmptyRoute,

    /// Consecutive legs don't share a place
    #[error("places {0} and {1} are not connected")]
    LegsNotConnected(PlaceId, PlaceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::EmptyRoute;
        assert_eq!(err.to_string(), "route must have at least one leg");

        let err = DomainError::LegsNotConnected(PlaceId(1), PlaceId(4));
        assert_eq!(err.to_string(), "places P1 and P4 are not connected");
    }
}

use thiserror::Error;

/// Field-level validation failures raised at the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("pricePerNight must be a non-negative number")]
    InvalidPrice,
}

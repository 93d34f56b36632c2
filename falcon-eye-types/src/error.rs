use thiserror::Error;

/// Validation failures raised while constructing or updating an entity.
/// Always surfaced as HTTP 400 by the outermost adapter.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be between {1} and {2}")]
    OutOfRange(&'static str, String, String),
    #[error("{0} has invalid value {1:?}")]
    InvalidEnum(&'static str, String),
    #[error("{0} could not be parsed: {1}")]
    Malformed(&'static str, String),
}

use thiserror::Error;

/// Errors raised while building or checking intents.
#[derive(Error, Debug)]
pub enum PrimitivesError {
    /// Call-data could not be built from a stored intent.
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// Rejected at creation time; the caller sent something unusable.
    #[error("Invalid intent parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = core::result::Result<T, PrimitivesError>;

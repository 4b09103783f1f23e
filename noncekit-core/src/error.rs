//! Error types for the nonce store.

use thiserror::Error;

/// Result type for nonce store operations.
pub type NonceResult<T> = Result<T, NonceError>;

/// Errors raised while building a store or parsing tokens at an outer surface.
///
/// Validation never produces an error: `consume` and `peek` answer with a
/// plain `bool` so callers cannot tell an unknown token from an expired,
/// consumed or mismatched one.
#[derive(Debug, Error)]
pub enum NonceError {
    /// The OS secure random source failed while generating a salt.
    #[error("random source error: {0}")]
    RandomSource(String),

    /// The supplied configuration cannot be used.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The reclamation thread could not be started.
    #[error("reaper error: {0}")]
    Reaper(String),

    /// The presented text is not a well-formed token.
    #[error("invalid token")]
    InvalidToken,
}

impl From<getrandom::Error> for NonceError {
    fn from(error: getrandom::Error) -> Self {
        Self::RandomSource(error.to_string())
    }
}

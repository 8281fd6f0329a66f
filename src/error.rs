use crate::validation::ValidationError;
use thiserror::Error;

/// Failure to synthesize a pipeline definition
#[derive(Debug, Error)]
pub enum SynthError {
    /// Malformed input; nothing was defined
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generated build specification broke one of its own safety checks
    #[error("Generated build specification rejected: {0}")]
    SpecCheck(String),
}

impl SynthError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SynthError::Validation(_))
    }
}

use std::fmt;

/// Represents the errors that can occur while building or running the preprocessing pipeline.
///
/// None of these ever escape [`prepare`](super::PreprocessingPipeline::prepare); they
/// surface only from construction, or are logged before the pipeline degrades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    /// A normalization or parsing pattern failed to compile
    RuleError(String),
    /// Builder parameters outside the accepted bounds
    ValidationError(String),
    /// A preprocessing step aborted while handling one product
    StepFailed(String),
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleError(msg) => write!(f, "Rule error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::StepFailed(msg) => write!(f, "Preprocessing step failed: {}", msg),
        }
    }
}

impl std::error::Error for PreprocessError {}

impl From<regex::Error> for PreprocessError {
    fn from(err: regex::Error) -> Self {
        PreprocessError::RuleError(err.to_string())
    }
}

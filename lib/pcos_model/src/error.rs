use thiserror::Error;

/// Errors raised while loading a model artifact or running inference.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("invalid model output: {0}")]
    InvalidOutput(String),
}

impl ModelError {
    pub(crate) fn artifact(message: impl Into<String>) -> Self {
        ModelError::InvalidArtifact(message.into())
    }
}

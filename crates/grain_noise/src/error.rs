use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum NoiseError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("seed cannot be used: {0}")]
    SeedType(String),
}

impl NoiseError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        NoiseError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<grain_random::SeedError> for NoiseError {
    fn from(value: grain_random::SeedError) -> Self {
        NoiseError::SeedType(value.to_string())
    }
}

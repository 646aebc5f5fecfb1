/// Convenience result type used across inkfade.
pub type InkfadeResult<T> = Result<T, InkfadeError>;

/// Error taxonomy shared by the sampler, the scene contract and the dissolve controller.
///
/// None of these reach the caller of [`crate::StrokeDissolver::begin_conversion`] or
/// [`crate::StrokeDissolver::tick`]: the controller turns them into skipped work.
#[derive(thiserror::Error, Debug)]
pub enum InkfadeError {
    /// Polyline with fewer than two points or a non-finite coordinate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Handle to a stroke or particle that the host has already destroyed.
    #[error("stale reference: {0}")]
    StaleReference(String),

    /// Rejected configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InkfadeError {
    /// Build an [`InkfadeError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build an [`InkfadeError::StaleReference`] value.
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::StaleReference(msg.into())
    }

    /// Build an [`InkfadeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`InkfadeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors the controller treats as "object went away, skip this action".
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleReference(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

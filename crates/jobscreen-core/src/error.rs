//! Error types for JobScreen

/// Result type alias using JobScreen's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for JobScreen operations
///
/// Short or empty postings are not errors: they come back as
/// [`crate::InferenceOutcome::InsufficientData`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Vocabulary or model artifact failed to resolve or load
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error should stop the process from serving requests
    pub fn is_startup_fatal(&self) -> bool {
        matches!(self, Self::Artifact(_) | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::artifact("tokenizer.json not found");
        assert_eq!(err.to_string(), "artifact error: tokenizer.json not found");

        let err = Error::config("suspicious threshold must be below fake threshold");
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_startup_fatal() {
        assert!(Error::artifact("missing").is_startup_fatal());
        assert!(Error::config("bad").is_startup_fatal());
        assert!(!Error::classifier("forward pass").is_startup_fatal());
    }
}

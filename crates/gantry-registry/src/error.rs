//! Registry error types

use thiserror::Error;

/// Registry-related errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Command execution failed
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },

    /// Publish command exited non-zero
    #[error("Failed to publish package: {0}")]
    PublishFailed(String),

    /// Credential prompt failed
    #[error("Failed to read one-time password: {0}")]
    PromptFailed(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

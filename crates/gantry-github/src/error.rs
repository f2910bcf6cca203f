//! Hosted-release error types

use thiserror::Error;

/// Errors from the hosted-release service
#[derive(Debug, Error)]
pub enum GithubError {
    /// No access token configured
    #[error("No release token provided. Pass --token or set GITHUB_TOKEN")]
    MissingToken,

    /// API error from the service
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Release creation failed
    #[error("Failed to create release: {0}")]
    ReleaseFailed(String),

    /// Asset upload failed
    #[error("Failed to upload asset {name}: {reason}")]
    AssetUploadFailed { name: String, reason: String },

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hosted-release operations
pub type Result<T> = std::result::Result<T, GithubError>;

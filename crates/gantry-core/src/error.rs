//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Manifest-related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Template-related errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
///
/// These are all raised before anything on disk has been mutated, so
/// they never require a version rollback.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No access token for the hosted-release service
    #[error("No release token provided. Pass --token or set GITHUB_TOKEN")]
    MissingToken,

    /// Repository owner/name could not be determined
    #[error("Cannot determine repository owner/name: {0}")]
    MissingRepository(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Failed to parse version
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, String),

    /// Invalid bump kind
    #[error("Invalid bump kind '{0}'. Expected one of: patch, minor, major, prepatch, preminor, premajor, prerelease")]
    InvalidBumpKind(String),
}

/// Manifest-related errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("Package manifest not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse manifest
    #[error("Failed to parse manifest: {0}")]
    ParseError(String),

    /// Failed to write manifest
    #[error("Failed to write manifest: {0}")]
    WriteError(String),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Failed to create a commit
    #[error("Failed to commit: {0}")]
    CommitFailed(String),

    /// Failed to push
    #[error("Failed to push to remote: {0}")]
    PushFailed(String),

    /// Command execution failed
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Template-related errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Invalid glob pattern in a template group
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Failed to render a template file
    #[error("Failed to render template {path}: {reason}")]
    RenderFailed { path: PathBuf, reason: String },

    /// Failed to write a rendered file
    #[error("Failed to write rendered file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GantryError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

//! Per-run release context

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::RepoInfo;
use crate::manifest::PackageManifest;

/// Default commit message body when no comment is given
pub const DEFAULT_COMMENT: &str = "release commit";

/// Transient state for one release run
///
/// Created when the run starts and discarded at exit; never persisted.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Version before any mutation
    pub old_version: String,

    /// Bumped version, if a bump was requested
    pub new_version: Option<String>,

    /// Free text used for the commit message and release body
    pub comment: Option<String>,

    /// Set once the push has succeeded; from then on the version bump
    /// is part of remote history and must not be rolled back
    pub confirmed: bool,
}

impl ReleaseContext {
    /// Create a context for a run starting from `old_version`
    pub fn new(old_version: impl Into<String>) -> Self {
        Self {
            old_version: old_version.into(),
            new_version: None,
            comment: None,
            confirmed: false,
        }
    }

    /// Set the comment text
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// The version this run is releasing
    pub fn version(&self) -> &str {
        self.new_version.as_deref().unwrap_or(&self.old_version)
    }

    /// Commit message: `<version> - <comment-or-default>`
    pub fn commit_message(&self) -> String {
        format!(
            "{} - {}",
            self.version(),
            self.comment.as_deref().unwrap_or(DEFAULT_COMMENT)
        )
    }

    /// Release title: `<package name> v<version>`
    pub fn release_name(&self, package_name: &str) -> String {
        format!("{} v{}", package_name, self.version())
    }
}

/// Parameters exposed to templates
#[derive(Debug, Clone, Serialize)]
pub struct TemplateParams {
    /// Version being released
    pub version: String,

    /// Render timestamp (RFC 3339)
    pub timestamp: String,

    /// Package name
    pub name: String,

    /// Repository coordinates, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepoInfo>,

    /// The full manifest as JSON
    pub manifest: serde_json::Value,
}

impl TemplateParams {
    /// Build parameters from the manifest state at render time
    pub fn new(
        manifest: &PackageManifest,
        repository: Option<RepoInfo>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            version: manifest.version.clone(),
            timestamp: timestamp.to_rfc3339(),
            name: manifest.name.clone(),
            repository,
            manifest: serde_json::to_value(manifest).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_prefers_new() {
        let mut ctx = ReleaseContext::new("1.0.0");
        assert_eq!(ctx.version(), "1.0.0");

        ctx.new_version = Some("1.1.0".to_string());
        assert_eq!(ctx.version(), "1.1.0");
    }

    #[test]
    fn test_commit_message_default() {
        let mut ctx = ReleaseContext::new("1.0.0");
        ctx.new_version = Some("1.1.0".to_string());
        assert_eq!(ctx.commit_message(), "1.1.0 - release commit");
    }

    #[test]
    fn test_commit_message_with_comment() {
        let ctx = ReleaseContext::new("1.0.0").with_comment(Some("fix the widget".to_string()));
        assert_eq!(ctx.commit_message(), "1.0.0 - fix the widget");
    }

    #[test]
    fn test_release_name() {
        let mut ctx = ReleaseContext::new("1.0.0");
        ctx.new_version = Some("2.0.0".to_string());
        assert_eq!(ctx.release_name("widget"), "widget v2.0.0");
    }
}

//! Package manifest handling
//!
//! The manifest is a human-formatted JSON file (`package.json` by
//! convention). Fields Gantry does not know about are preserved
//! byte-for-byte through a load/save round trip.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ReleaseConfig;
use crate::error::ManifestError;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Package manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Package description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Repository info (URL string or `{type, url}` object)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<serde_json::Value>,

    /// Release configuration block
    #[serde(rename = "gantry", skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseConfig>,

    /// Preserve other fields
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

impl PackageManifest {
    /// Load a manifest from path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ManifestError::NotFound(path.to_path_buf()))?;

        serde_json::from_str(&content).map_err(|e| ManifestError::ParseError(e.to_string()))
    }

    /// Save the manifest to path, human-formatted with a trailing newline
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ManifestError::WriteError(e.to_string()))?;

        let content = if content.ends_with('\n') {
            content
        } else {
            format!("{}\n", content)
        };

        std::fs::write(path, content).map_err(|e| ManifestError::WriteError(e.to_string()))
    }

    /// Replace the version field
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// The repository URL, from either a bare string or a `{url}` object
    pub fn repository_url(&self) -> Option<&str> {
        match self.repository.as_ref()? {
            serde_json::Value::String(url) => Some(url),
            serde_json::Value::Object(map) => map.get("url").and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(&path, r#"{"name": "test", "version": "1.0.0"}"#).unwrap();

        let pkg = PackageManifest::load(&path).unwrap();
        assert_eq!(pkg.name, "test");
        assert_eq!(pkg.version, "1.0.0");
        assert!(pkg.release.is_none());
    }

    #[test]
    fn test_load_with_release_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(
            &path,
            r#"{
                "name": "test",
                "version": "1.0.0",
                "gantry": {
                    "files": [{"src": "*.tpl", "cwd": "templates", "dest": "dist"}],
                    "assets": ["dist/*.zip"],
                    "library": "test-lib"
                }
            }"#,
        )
        .unwrap();

        let pkg = PackageManifest::load(&path).unwrap();
        let release = pkg.release.unwrap();
        assert_eq!(release.files.len(), 1);
        assert_eq!(release.files[0].cwd, "templates");
        assert_eq!(release.assets, vec!["dist/*.zip"]);
        assert_eq!(release.library, Some("test-lib".to_string()));
    }

    #[test]
    fn test_save_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(&path, r#"{"name": "test", "version": "1.0.0"}"#).unwrap();

        let mut pkg = PackageManifest::load(&path).unwrap();
        pkg.set_version("2.0.0");
        pkg.save(&path).unwrap();

        let loaded = PackageManifest::load(&path).unwrap();
        assert_eq!(loaded.version, "2.0.0");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_preserves_extra_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(
            &path,
            r#"{"name": "test", "version": "1.0.0", "scripts": {"build": "make"}}"#,
        )
        .unwrap();

        let mut pkg = PackageManifest::load(&path).unwrap();
        assert!(pkg.other.contains_key("scripts"));

        pkg.set_version("1.0.1");
        pkg.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("scripts"));
        assert!(content.contains("make"));
    }

    #[test]
    fn test_repository_url_forms() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package.json");

        std::fs::write(
            &path,
            r#"{"name": "a", "version": "0.1.0", "repository": "https://github.com/owner/repo.git"}"#,
        )
        .unwrap();
        let pkg = PackageManifest::load(&path).unwrap();
        assert_eq!(
            pkg.repository_url(),
            Some("https://github.com/owner/repo.git")
        );

        std::fs::write(
            &path,
            r#"{"name": "a", "version": "0.1.0", "repository": {"type": "git", "url": "git+https://github.com/owner/repo.git"}}"#,
        )
        .unwrap();
        let pkg = PackageManifest::load(&path).unwrap();
        assert_eq!(
            pkg.repository_url(),
            Some("git+https://github.com/owner/repo.git")
        );
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let result = PackageManifest::load(&temp.path().join("package.json"));
        assert!(matches!(result, Err(ManifestError::NotFound(_))));
    }
}

//! Release configuration types
//!
//! The configuration lives inside the package manifest under the
//! `gantry` key and is deserialized once at load time into typed
//! structures.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::manifest::PackageManifest;

/// Release configuration block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Template groups to render
    #[serde(default)]
    pub files: Vec<TemplateGroup>,

    /// Glob patterns for release assets
    #[serde(default)]
    pub assets: Vec<String>,

    /// Hosted-repository name, when it differs from the package name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,

    /// Hosted-repository owner override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// A group of template files sharing a base directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateGroup {
    /// Glob pattern, relative to `cwd`
    pub src: String,

    /// Source base directory
    #[serde(default = "default_cwd")]
    pub cwd: String,

    /// Destination directory for rendered output
    pub dest: String,
}

fn default_cwd() -> String {
    ".".to_string()
}

/// Hosted repository coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Repository owner (user or organization)
    pub owner: String,

    /// Repository name
    pub name: String,
}

impl RepoInfo {
    /// Resolve owner/name from the manifest
    ///
    /// The repository URL is consulted first; explicit `owner` and
    /// `library` entries in the release config override the derived
    /// owner and name respectively.
    pub fn resolve(manifest: &PackageManifest) -> Result<Self, ConfigError> {
        let from_url = manifest.repository_url().and_then(Self::parse_url);

        let config = manifest.release.as_ref();
        let owner = config
            .and_then(|c| c.owner.clone())
            .or_else(|| from_url.as_ref().map(|r| r.owner.clone()));
        let name = config
            .and_then(|c| c.library.clone())
            .or_else(|| from_url.as_ref().map(|r| r.name.clone()));

        match (owner, name) {
            (Some(owner), Some(name)) => Ok(Self { owner, name }),
            _ => Err(ConfigError::MissingRepository(
                "set a repository URL in the manifest, or owner/library in the release config"
                    .to_string(),
            )),
        }
    }

    /// Extract owner/name from a repository URL
    fn parse_url(url: &str) -> Option<Self> {
        // Accepts https, git+https, and ssh forms
        let re = Regex::new(r"github\.com[/:]([\w.-]+)/([\w.-]+?)(?:\.git)?/?$")
            .expect("valid repository regex");

        let caps = re.captures(url)?;
        Some(Self {
            owner: caps.get(1)?.as_str().to_string(),
            name: caps.get(2)?.as_str().to_string(),
        })
    }
}

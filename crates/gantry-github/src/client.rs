//! GitHub REST API client

use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{GithubError, Result};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_UPLOADS_BASE: &str = "https://uploads.github.com";

/// GitHub API client
#[derive(Clone)]
pub struct GithubClient {
    token: String,
    api_base: String,
    uploads_base: String,
    client: Client,
}

/// A created release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Release id, used for asset uploads
    pub id: u64,

    /// Tag the release points at
    pub tag_name: String,

    /// Browser URL of the release page
    #[serde(default)]
    pub html_url: Option<String>,
}

impl GithubClient {
    /// Create a new client with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            uploads_base: DEFAULT_UPLOADS_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Override the API base URLs (used by tests)
    pub fn with_base_urls(mut self, api: impl Into<String>, uploads: impl Into<String>) -> Self {
        self.api_base = api.into();
        self.uploads_base = uploads.into();
        self
    }

    /// Resolve a token from an explicit flag value or the environment
    pub fn resolve_token(flag: Option<String>) -> Result<String> {
        flag.filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
            .ok_or(GithubError::MissingToken)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "gantry")
    }

    /// Create a tagged release
    #[instrument(skip(self, body), fields(owner, repo, tag))]
    pub async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: &str,
        body: &str,
    ) -> Result<Release> {
        let url = format!("{}/repos/{}/{}/releases", self.api_base, owner, repo);
        debug!(url, "creating release");

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&serde_json::json!({
                "tag_name": tag,
                "name": name,
                "body": body,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let release: Release = response.json().await?;
        info!(id = release.id, tag, "created release");
        Ok(release)
    }

    /// Upload one asset to a release
    #[instrument(skip(self), fields(release_id = release.id, path = %path.display()))]
    pub async fn upload_asset(&self, owner: &str, repo: &str, release: &Release, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = tokio::fs::read(path).await?;
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets?name={}",
            self.uploads_base, owner, repo, release.id, name
        );

        let response = self
            .request(reqwest::Method::POST, &url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        info!(name, "uploaded asset");
        Ok(())
    }

    /// Upload assets concurrently, collecting per-asset failures
    ///
    /// Failures are returned, not raised: one bad asset must not sink
    /// the batch or the release.
    pub async fn upload_assets(
        &self,
        owner: &str,
        repo: &str,
        release: &Release,
        assets: Vec<PathBuf>,
    ) -> Vec<(PathBuf, GithubError)> {
        let mut tasks = JoinSet::new();

        for path in assets {
            let client = self.clone();
            let release = release.clone();
            let (owner, repo) = (owner.to_string(), repo.to_string());
            tasks.spawn(async move {
                let result = client.upload_asset(&owner, &repo, &release, &path).await;
                (path, result)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((path, Err(err))) => {
                    warn!(path = %path.display(), error = %err, "asset upload failed");
                    failures.push((path, err));
                }
                Ok((_, Ok(()))) => {}
                Err(join_err) => {
                    warn!(error = %join_err, "asset upload task panicked");
                }
            }
        }

        failures
    }

    /// Create a repository for the authenticated user
    #[instrument(skip(self), fields(name))]
    pub async fn create_repository(&self, name: &str) -> Result<()> {
        let url = format!("{}/user/repos", self.api_base);

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        info!(name, "created repository");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_token_prefers_flag() {
        let token = GithubClient::resolve_token(Some("abc".to_string())).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_resolve_token_rejects_empty_flag() {
        // An empty flag value falls through to the environment; with
        // neither set the error tells the user what to do.
        std::env::remove_var("GITHUB_TOKEN");
        let result = GithubClient::resolve_token(Some(String::new()));
        assert!(matches!(result, Err(GithubError::MissingToken)));
    }

    #[test]
    fn test_release_deserializes() {
        let release: Release = serde_json::from_str(
            r#"{"id": 42, "tag_name": "1.2.3", "html_url": "https://github.com/a/b/releases/tag/1.2.3", "draft": false}"#,
        )
        .unwrap();
        assert_eq!(release.id, 42);
        assert_eq!(release.tag_name, "1.2.3");
    }

    #[tokio::test]
    async fn test_upload_assets_empty_batch() {
        let client = GithubClient::new("t");
        let release = Release {
            id: 1,
            tag_name: "1.0.0".to_string(),
            html_url: None,
        };
        let failures = client.upload_assets("o", "r", &release, Vec::new()).await;
        assert!(failures.is_empty());
    }
}

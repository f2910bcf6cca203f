//! Release pipeline
//!
//! Stages run strictly in order: version bump, template rendering,
//! then Git → HostedRelease → Registry. The push at the end of the Git
//! stage is the durability boundary: until it succeeds, any fatal
//! failure restores the pre-run version; after it, the bump is part of
//! remote history and a failure only produces a warning.

use std::path::{Path, PathBuf};

use console::style;
use tracing::{info, warn};

use gantry_core::error::{ConfigError, GitError};
use gantry_core::templates;
use gantry_core::{bump, BumpKind, PackageManifest, ReleaseContext, RepoInfo, TemplateParams};
use gantry_git::{git_push, git_push_upstream, GitRepo};
use gantry_github::{GithubClient, GithubError};
use gantry_registry::{NpmPublisher, OtpProvider};

use crate::cli::Cli;
use crate::rollback::RollbackGuard;

/// Manifest file name, relative to the working directory
pub const MANIFEST_FILE: &str = "package.json";

/// Remote name used for pushes
pub const DEFAULT_REMOTE: &str = "origin";

/// Which stages this invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    /// Render template groups
    pub templates: bool,
    /// Commit and push
    pub git: bool,
    /// Create the hosted release and upload assets
    pub github: bool,
    /// Publish to the package registry
    pub npm: bool,
}

impl StagePlan {
    /// Derive the plan from CLI flags
    pub fn from_cli(cli: &Cli) -> Self {
        let templates = !cli.no_templates;

        // Templates-only mode skips every publish stage
        if cli.templates {
            return Self {
                templates,
                git: false,
                github: false,
                npm: false,
            };
        }

        Self {
            templates,
            git: !cli.no_git,
            github: !cli.no_github,
            // -g selects the hosted release exclusively
            npm: !cli.no_npm && !cli.github,
        }
    }
}

/// One release run
pub struct ReleasePipeline {
    cli: Cli,
    plan: StagePlan,
    manifest_path: PathBuf,
    manifest: PackageManifest,
    ctx: ReleaseContext,
    bump_kind: Option<BumpKind>,
    token: Option<String>,
    repo_info: Option<RepoInfo>,
    warnings: Vec<String>,
}

impl ReleasePipeline {
    /// Load the manifest and run every fail-fast check
    ///
    /// Everything that can be rejected is rejected here, before any
    /// file has been mutated: unknown bump kinds, a missing token when
    /// the hosted-release stage will run, unresolvable repository
    /// coordinates.
    pub fn prepare(cli: Cli) -> anyhow::Result<Self> {
        let manifest_path = PathBuf::from(MANIFEST_FILE);
        let manifest = PackageManifest::load(&manifest_path)?;
        let plan = StagePlan::from_cli(&cli);

        let bump_kind = cli
            .version
            .as_deref()
            .map(str::parse::<BumpKind>)
            .transpose()?;

        let (token, repo_info) = if plan.github {
            let token = GithubClient::resolve_token(cli.token.clone())?;
            let repo_info = RepoInfo::resolve(&manifest)?;
            (Some(token), Some(repo_info))
        } else {
            (cli.token.clone(), RepoInfo::resolve(&manifest).ok())
        };

        let ctx = ReleaseContext::new(manifest.version.clone()).with_comment(cli.comment());

        Ok(Self {
            cli,
            plan,
            manifest_path,
            manifest,
            ctx,
            bump_kind,
            token,
            repo_info,
            warnings: Vec::new(),
        })
    }

    /// Run the pipeline to completion or first fatal failure
    pub fn run(mut self) -> anyhow::Result<()> {
        let mut guard = self.apply_bump()?;

        match self.stages(&mut guard) {
            Ok(()) => {
                for warning in &self.warnings {
                    eprintln!("{} {}", style("!").yellow().bold(), warning);
                }
                self.status(format!(
                    "released {} {}",
                    self.manifest.name,
                    self.ctx.version()
                ));
                Ok(())
            }
            Err(err) => {
                if self.ctx.confirmed {
                    // The bump is in pushed history; rewriting the
                    // local manifest would desynchronize it from the
                    // remote, so leave it and say so.
                    warn!(
                        version = self.ctx.version(),
                        "stage failed after push; version bump kept"
                    );
                    eprintln!(
                        "{} version {} is already committed and pushed; the manifest was left at the released version to stay consistent with the remote",
                        style("!").yellow().bold(),
                        self.ctx.version()
                    );
                } else {
                    guard.restore();
                }
                Err(err)
            }
        }
    }

    /// Bump and persist the version, opening the rollback obligation
    fn apply_bump(&mut self) -> anyhow::Result<RollbackGuard> {
        let Some(kind) = self.bump_kind else {
            return Ok(RollbackGuard::disarmed());
        };

        let new_version = bump(&self.manifest.version, kind)?;
        info!(old = %self.ctx.old_version, new = %new_version, %kind, "bumping version");

        self.manifest.set_version(new_version.clone());
        // Written immediately: template rendering reads the new value
        self.manifest.save(&self.manifest_path)?;
        self.ctx.new_version = Some(new_version);

        Ok(RollbackGuard::armed(
            self.manifest_path.clone(),
            self.ctx.old_version.clone(),
        ))
    }

    fn stages(&mut self, guard: &mut RollbackGuard) -> anyhow::Result<()> {
        self.render_templates()?;
        self.git_stage(guard)?;
        self.github_stage()?;
        self.registry_stage()?;
        Ok(())
    }

    /// Render configured template groups, strictly sequentially
    fn render_templates(&mut self) -> anyhow::Result<()> {
        if !self.plan.templates {
            return Ok(());
        }
        let Some(config) = self.manifest.release.clone() else {
            return Ok(());
        };
        if config.files.is_empty() {
            return Ok(());
        }

        let params = TemplateParams::new(
            &self.manifest,
            self.repo_info.clone(),
            chrono::Utc::now(),
        );
        let written = templates::render_groups(&config.files, &params)?;
        self.status(format!("rendered {} template file(s)", written.len()));
        Ok(())
    }

    /// Commit and push; crossing this stage makes the bump durable
    fn git_stage(&mut self, guard: &mut RollbackGuard) -> anyhow::Result<()> {
        if !self.plan.git {
            return Ok(());
        }

        let cwd = std::env::current_dir()?;
        match GitRepo::discover(&cwd) {
            Ok(repo) => {
                repo.stage_all()?;
                if repo.has_staged_changes()? {
                    repo.commit(&self.ctx.commit_message())?;
                }
                git_push(&cwd, DEFAULT_REMOTE)?;
            }
            Err(GitError::NotARepository(_)) => self.bootstrap_repository(&cwd)?,
            Err(err) => return Err(err.into()),
        }

        self.ctx.confirmed = true;
        guard.disarm();
        self.status(format!("pushed {}", self.ctx.version()));
        Ok(())
    }

    /// First release from a directory that is not yet a repository:
    /// init, commit, create the hosted repository, push with tracking.
    fn bootstrap_repository(&self, cwd: &Path) -> anyhow::Result<()> {
        let repo_info = self
            .repo_info
            .clone()
            .ok_or_else(|| {
                ConfigError::MissingRepository(
                    "creating the hosted repository needs a repository URL or owner/library config"
                        .to_string(),
                )
            })?;
        let token = GithubClient::resolve_token(self.token.clone())?;

        let repo = GitRepo::init(cwd)?;
        repo.stage_all()?;
        repo.commit(&self.ctx.commit_message())?;

        let client = GithubClient::new(token);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(client.create_repository(&repo_info.name))?;

        repo.add_remote(
            DEFAULT_REMOTE,
            &format!(
                "https://github.com/{}/{}.git",
                repo_info.owner, repo_info.name
            ),
        )?;
        git_push_upstream(cwd, DEFAULT_REMOTE)?;
        Ok(())
    }

    /// Create the hosted release and upload assets
    ///
    /// Release creation failure is fatal; individual asset failures
    /// are collected as warnings and never sink the stage.
    fn github_stage(&mut self) -> anyhow::Result<()> {
        if !self.plan.github {
            return Ok(());
        }

        let token = self.token.clone().ok_or(ConfigError::MissingToken)?;
        let repo_info = self.repo_info.clone().ok_or_else(|| {
            ConfigError::MissingRepository("hosted release needs repository coordinates".to_string())
        })?;

        let client = GithubClient::new(token);
        let runtime = tokio::runtime::Runtime::new()?;

        let tag = self.ctx.version().to_string();
        let name = self.ctx.release_name(&self.manifest.name);
        let body = self.ctx.comment.clone().unwrap_or_default();

        let release = runtime
            .block_on(client.create_release(&repo_info.owner, &repo_info.name, &tag, &name, &body))
            .map_err(|e| GithubError::ReleaseFailed(e.to_string()))?;

        // Assets are globbed at stage time; runs are stateless and a
        // retry re-globs from scratch.
        let assets = self.expand_assets();
        if !assets.is_empty() {
            let failures = runtime.block_on(client.upload_assets(
                &repo_info.owner,
                &repo_info.name,
                &release,
                assets,
            ));
            for (path, err) in failures {
                self.warnings
                    .push(format!("asset upload failed for {}: {}", path.display(), err));
            }
        }

        self.status(format!("published release {}", name));
        Ok(())
    }

    /// Expand configured asset globs against the working directory
    fn expand_assets(&mut self) -> Vec<PathBuf> {
        let patterns = match &self.manifest.release {
            Some(config) => config.assets.clone(),
            None => return Vec::new(),
        };

        let mut assets = Vec::new();
        for pattern in &patterns {
            match glob::glob(pattern) {
                Ok(entries) => {
                    assets.extend(entries.flatten().filter(|p| p.is_file()));
                }
                Err(err) => {
                    self.warnings
                        .push(format!("invalid asset pattern '{}': {}", pattern, err));
                }
            }
        }
        assets
    }

    /// Publish to the package registry through the npm CLI
    fn registry_stage(&mut self) -> anyhow::Result<()> {
        if !self.plan.npm {
            return Ok(());
        }

        let provider = match &self.cli.otp {
            Some(value) => OtpProvider::Fixed(value.clone()),
            None => OtpProvider::Interactive,
        };
        let otp = provider.obtain()?;

        NpmPublisher::new(std::env::current_dir()?).publish(otp.as_deref())?;
        self.status("published to registry");
        Ok(())
    }

    fn status(&self, message: impl AsRef<str>) {
        if !self.cli.quiet {
            println!("{} {}", style("✓").green(), message.as_ref());
        }
    }
}

//! CLI definition

use clap::Parser;

use crate::pipeline::ReleasePipeline;

/// Gantry - release orchestration CLI
///
/// Bumps the manifest version, renders templates, then runs the
/// publish pipeline: commit/push, hosted release with assets, registry
/// publish.
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Bump the package version (patch, minor, major, prepatch,
    /// preminor, premajor, prerelease)
    #[arg(short = 'v', long = "version", value_name = "KIND")]
    pub version: Option<String>,

    /// Render templates only, skip all publish stages
    #[arg(short = 't', long)]
    pub templates: bool,

    /// Skip template rendering
    #[arg(long)]
    pub no_templates: bool,

    /// Skip the git commit and push stage
    #[arg(long)]
    pub no_git: bool,

    /// Publish the hosted release only (skips the registry stage)
    #[arg(short = 'g', long)]
    pub github: bool,

    /// Skip the hosted release stage
    #[arg(long)]
    pub no_github: bool,

    /// Skip the registry publish stage
    #[arg(long)]
    pub no_npm: bool,

    /// Registry one-time password, skipping the interactive prompt
    #[arg(short = 'o', long, value_name = "CODE")]
    pub otp: Option<String>,

    /// Commit message and release body text
    #[arg(short = 'c', long, value_name = "TEXT")]
    pub comment: Option<String>,

    /// Hosted-release access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Working directory
    #[arg(short = 'C', long)]
    pub directory: Option<std::path::PathBuf>,

    /// Suppress output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Positional fallback for --comment
    #[arg(value_name = "COMMENT")]
    pub comment_arg: Option<String>,
}

impl Cli {
    /// Execute the release pipeline
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        ReleasePipeline::prepare(self)?.run()
    }

    /// Comment text: `--comment` wins over the positional argument
    pub fn comment(&self) -> Option<String> {
        self.comment.clone().or_else(|| self.comment_arg.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_flag_wins_over_positional() {
        let cli = Cli::try_parse_from(["gantry", "-c", "from flag", "from positional"]).unwrap();
        assert_eq!(cli.comment(), Some("from flag".to_string()));
    }

    #[test]
    fn test_positional_comment_fallback() {
        let cli = Cli::try_parse_from(["gantry", "fix the widget"]).unwrap();
        assert_eq!(cli.comment(), Some("fix the widget".to_string()));
    }

    #[test]
    fn test_version_flag_takes_kind() {
        let cli = Cli::try_parse_from(["gantry", "-v", "minor"]).unwrap();
        assert_eq!(cli.version.as_deref(), Some("minor"));
    }

    #[test]
    fn test_skip_flags() {
        let cli =
            Cli::try_parse_from(["gantry", "--no-git", "--no-github", "--no-npm"]).unwrap();
        assert!(cli.no_git);
        assert!(cli.no_github);
        assert!(cli.no_npm);
    }
}

//! npm registry publishing

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, instrument};

use crate::error::{RegistryError, Result};

/// Publishes a package directory through the `npm` CLI
pub struct NpmPublisher {
    package_dir: PathBuf,
}

impl NpmPublisher {
    /// Create a publisher for the given package directory
    pub fn new(package_dir: impl Into<PathBuf>) -> Self {
        Self {
            package_dir: package_dir.into(),
        }
    }

    /// The package directory
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// Run `npm publish`, passing the OTP when one is supplied
    #[instrument(skip(self), fields(dir = %self.package_dir.display()))]
    pub fn publish(&self, otp: Option<&str>) -> Result<()> {
        let mut cmd = self.build_command(otp);

        let output = cmd.output().map_err(|e| RegistryError::CommandFailed {
            command: "npm publish".to_string(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RegistryError::PublishFailed(stderr.trim().to_string()));
        }

        info!("published to registry");
        Ok(())
    }

    fn build_command(&self, otp: Option<&str>) -> Command {
        let mut cmd = Command::new("npm");
        cmd.arg("publish");
        cmd.current_dir(&self.package_dir);

        if let Some(otp) = otp {
            cmd.arg("--otp").arg(otp);
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_command_without_otp() {
        let publisher = NpmPublisher::new(".");
        let cmd = publisher.build_command(None);
        assert_eq!(args_of(&cmd), vec!["publish"]);
    }

    #[test]
    fn test_command_with_otp() {
        let publisher = NpmPublisher::new(".");
        let cmd = publisher.build_command(Some("123456"));
        assert_eq!(args_of(&cmd), vec!["publish", "--otp", "123456"]);
    }
}

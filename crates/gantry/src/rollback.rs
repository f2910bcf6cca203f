//! Version rollback
//!
//! The guard is armed when the bumped version is written to the
//! manifest and disarmed once the push succeeds. Restoration is the
//! pipeline's explicit failure path, not a process-exit hook, and is
//! best-effort: a manifest that cannot be rewritten is logged, never
//! a second failure.

use std::path::PathBuf;

use tracing::{info, warn};

use gantry_core::PackageManifest;

/// Restores the manifest's pre-run version on failure
#[derive(Debug)]
pub struct RollbackGuard {
    manifest_path: PathBuf,
    old_version: String,
    armed: bool,
}

impl RollbackGuard {
    /// Guard an applied version bump
    pub fn armed(manifest_path: PathBuf, old_version: String) -> Self {
        Self {
            manifest_path,
            old_version,
            armed: true,
        }
    }

    /// Guard for a run without a bump; never restores anything
    pub fn disarmed() -> Self {
        Self {
            manifest_path: PathBuf::new(),
            old_version: String::new(),
            armed: false,
        }
    }

    /// Whether a restore would still rewrite the manifest
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Drop the rollback obligation (the bump is durable)
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Rewrite the manifest back to the pre-run version
    ///
    /// Idempotent: only the first call does anything.
    pub fn restore(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        match PackageManifest::load(&self.manifest_path) {
            Ok(mut manifest) => {
                manifest.set_version(self.old_version.clone());
                match manifest.save(&self.manifest_path) {
                    Ok(()) => {
                        info!(version = %self.old_version, "restored manifest version");
                    }
                    Err(err) => {
                        warn!(error = %err, "could not restore manifest version");
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "could not reload manifest for rollback");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, version: &str) -> PathBuf {
        let path = dir.path().join("package.json");
        std::fs::write(
            &path,
            format!(r#"{{"name": "test", "version": "{}"}}"#, version),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_restore_rewrites_version() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "1.3.0");

        let mut guard = RollbackGuard::armed(path.clone(), "1.2.3".to_string());
        guard.restore();

        let manifest = PackageManifest::load(&path).unwrap();
        assert_eq!(manifest.version, "1.2.3");
    }

    #[test]
    fn test_restore_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "1.3.0");

        let mut guard = RollbackGuard::armed(path.clone(), "1.2.3".to_string());
        guard.restore();

        // A later write must survive the second restore call
        std::fs::write(
            &path,
            r#"{"name": "test", "version": "9.9.9"}"#,
        )
        .unwrap();
        guard.restore();

        let manifest = PackageManifest::load(&path).unwrap();
        assert_eq!(manifest.version, "9.9.9");
    }

    #[test]
    fn test_disarmed_guard_leaves_manifest_alone() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(&temp, "1.3.0");

        let mut guard = RollbackGuard::armed(path.clone(), "1.2.3".to_string());
        guard.disarm();
        guard.restore();

        let manifest = PackageManifest::load(&path).unwrap();
        assert_eq!(manifest.version, "1.3.0");
    }

    #[test]
    fn test_restore_missing_manifest_does_not_panic() {
        let mut guard = RollbackGuard::armed(
            PathBuf::from("/nonexistent/package.json"),
            "1.0.0".to_string(),
        );
        guard.restore();
        assert!(!guard.is_armed());
    }
}

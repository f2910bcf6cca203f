//! Staging and committing

use git2::Signature;
use tracing::{info, instrument};

use crate::repository::{GitRepo, Result};
use gantry_core::error::GitError;

impl GitRepo {
    /// Stage all working-tree changes into the index
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    /// Check whether the index differs from the last commit
    ///
    /// On an unborn branch this is true as soon as the index holds any
    /// entry at all.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let mut index = self.repo.index()?;

        let head_tree = match self.repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };

        match head_tree {
            Some(tree) => {
                let diff = self
                    .repo
                    .diff_tree_to_index(Some(&tree), Some(&index), None)?;
                Ok(diff.deltas().len() > 0)
            }
            None => Ok(!index.is_empty()),
        }
    }

    /// Commit the current index
    #[instrument(skip(self), fields(message))]
    pub fn commit(&self, message: &str) -> Result<String> {
        let sig = self.signature()?;

        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(|e| GitError::CommitFailed(e.to_string()))?;

        info!(oid = %oid, message, "created commit");
        Ok(oid.to_string())
    }

    /// Committer signature from config, with a fallback identity
    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now("gantry", "gantry@localhost")?),
        }
    }
}

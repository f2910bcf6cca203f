//! Git operations for Gantry
//!
//! In-process work (status, staging, committing, remote setup) goes
//! through git2; pushes shell out to the `git` CLI so the user's
//! credential helpers apply.

pub mod commit;
pub mod remote;
pub mod repository;

pub use remote::{git_push, git_push_upstream};
pub use repository::{GitRepo, Result};

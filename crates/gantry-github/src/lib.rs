//! Hosted-release client for Gantry
//!
//! Talks to the GitHub REST API: release creation, asset upload, and
//! repository creation. Asset uploads are independent of each other
//! and fan out concurrently; a failed upload is reported back as a
//! warning, never as a stage failure.

pub mod client;
pub mod error;

pub use client::{GithubClient, Release};
pub use error::{GithubError, Result};

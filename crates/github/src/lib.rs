//! Publishing generated code to GitHub.

pub mod client;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::{encode_content, GitHubClient, DEFAULT_API_URL};
pub use types::{FileCommit, GitRef, PublishResult, PullRequest, RepoFile};

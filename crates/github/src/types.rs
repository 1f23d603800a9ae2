//! GitHub REST payloads.

use serde::{Deserialize, Serialize};

/// A file returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepoFile {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response of a contents `PUT`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileCommit {
    #[serde(default)]
    pub content: Option<HtmlLink>,
    #[serde(default)]
    pub commit: Option<HtmlLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HtmlLink {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A git reference such as `refs/heads/main`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Outcome of publishing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub status: String,
    pub file_path: String,
    pub branch: String,
    pub commit_url: String,
    pub file_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PutFileBody<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePullBody<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
}

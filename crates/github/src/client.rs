//! GitHub REST client.
//!
//! Talks to `{api_url}/repos/{owner}/{repo}` with `token` authentication.
//! File contents travel base64-encoded.

use crate::types::{
    CreatePullBody, CreateRefBody, FileCommit, GitObject, GitRef, PublishResult, PullRequest,
    PutFileBody, RepoFile,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use forge_core::{AppConfig, AppError, AppResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("forge/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
    base_branch: String,
}

impl GitHubClient {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::GitHub(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            base_branch: "main".to_string(),
        })
    }

    /// Build a client from the `github` section and `tokenEnv`.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let settings = &config.github;

        let token = config.resolve_github_token().ok_or_else(|| {
            AppError::Config(format!("GitHub token not found: set {}", settings.token_env))
        })?;
        let owner = settings
            .owner
            .clone()
            .ok_or_else(|| AppError::Config("GitHub owner not set (GITHUB_OWNER)".to_string()))?;
        let repo = settings
            .repo
            .clone()
            .ok_or_else(|| AppError::Config("GitHub repo not set (GITHUB_REPO)".to_string()))?;

        Ok(Self::new(token, owner, repo)?
            .with_api_url(&settings.api_url)
            .with_base_branch(&settings.base_branch))
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_base_branch(mut self, base_branch: &str) -> Self {
        self.base_branch = base_branch.to_string();
        self
    }

    pub fn base_branch(&self) -> &str {
        &self.base_branch
    }

    fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.owner, self.repo)
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(), path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
    }

    async fn send(&self, builder: RequestBuilder, action: &str) -> AppResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| AppError::GitHub(format!("{} failed: {}", action, e)))
    }

    /// Fetch file metadata at `git_ref`, or `None` when the file is absent.
    pub async fn get_file(&self, path: &str, git_ref: &str) -> AppResult<Option<RepoFile>> {
        let url = self.contents_url(path);
        let builder = self.request(Method::GET, &url).query(&[("ref", git_ref)]);
        let response = self.send(builder, "Get file").await?;

        match response.status() {
            StatusCode::OK => Ok(Some(parse_json(response, "file").await?)),
            StatusCode::NOT_FOUND => {
                tracing::info!("File {} not found in repository", path);
                Ok(None)
            }
            _ => Err(api_error(response, &format!("getting file {}", path)).await),
        }
    }

    /// Write `content` to `path` on `branch`, updating the file if it exists.
    pub async fn create_or_update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        branch: &str,
    ) -> AppResult<FileCommit> {
        let existing = self.get_file(path, branch).await?;
        match &existing {
            Some(_) => tracing::info!("Updating existing file {}", path),
            None => tracing::info!("Creating new file {}", path),
        }

        let body = PutFileBody {
            message,
            content: encode_content(content),
            branch,
            sha: existing.as_ref().map(|f| f.sha.as_str()),
        };

        let url = self.contents_url(path);
        let response = self
            .send(self.request(Method::PUT, &url).json(&body), "Write file")
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => parse_json(response, "commit").await,
            _ => Err(api_error(response, &format!("writing file {}", path)).await),
        }
    }

    /// Create `name` from the head of `base`. An existing branch is success.
    pub async fn create_branch(&self, name: &str, base: &str) -> AppResult<GitRef> {
        let url = format!("{}/git/ref/heads/{}", self.repo_url(), base);
        let response = self
            .send(self.request(Method::GET, &url), "Resolve base branch")
            .await?;
        if response.status() != StatusCode::OK {
            return Err(api_error(response, &format!("resolving branch {}", base)).await);
        }
        let base_ref: GitRef = parse_json(response, "reference").await?;
        let sha = base_ref.object.sha;

        let body = CreateRefBody {
            name: format!("refs/heads/{}", name),
            sha: &sha,
        };
        let url = format!("{}/git/refs", self.repo_url());
        let response = self
            .send(self.request(Method::POST, &url).json(&body), "Create branch")
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                tracing::info!("Created branch {} from {}", name, base);
                parse_json(response, "reference").await
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::warn!("Branch {} already exists", name);
                Ok(GitRef {
                    name: format!("refs/heads/{}", name),
                    object: GitObject { sha },
                })
            }
            _ => Err(api_error(response, &format!("creating branch {}", name)).await),
        }
    }

    pub async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> AppResult<PullRequest> {
        let payload = CreatePullBody {
            title,
            body,
            head,
            base,
        };
        let url = format!("{}/pulls", self.repo_url());
        let response = self
            .send(self.request(Method::POST, &url).json(&payload), "Create pull request")
            .await?;

        if response.status() != StatusCode::CREATED {
            return Err(api_error(response, "creating pull request").await);
        }

        tracing::info!("Created pull request: {}", title);
        parse_json(response, "pull request").await
    }

    /// Commit `code` to `file_path` on `branch`, creating the branch first
    /// when it is not the base branch.
    pub async fn commit_and_push(
        &self,
        code: &str,
        file_path: &str,
        message: &str,
        branch: &str,
    ) -> AppResult<PublishResult> {
        if branch != self.base_branch {
            self.create_branch(branch, &self.base_branch).await?;
        }

        let commit = self
            .create_or_update_file(file_path, code, message, branch)
            .await?;

        let link = |l: Option<crate::types::HtmlLink>| {
            l.and_then(|l| l.html_url).unwrap_or_default()
        };

        Ok(PublishResult {
            status: "success".to_string(),
            file_path: file_path.to_string(),
            branch: branch.to_string(),
            commit_url: link(commit.commit),
            file_url: link(commit.content),
        })
    }
}

/// Base64 of the UTF-8 bytes of `content`.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response, what: &str) -> AppResult<T> {
    response
        .json()
        .await
        .map_err(|e| AppError::GitHub(format!("Failed to parse {} response: {}", what, e)))
}

async fn api_error(response: Response, action: &str) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!("GitHub error {}: {} - {}", action, status, body);
    AppError::GitHub(format!("Error {}: {} - {}", action, status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        GitHubClient::new("ghp_test", "octo", "demo")
            .unwrap()
            .with_api_url("http://localhost:9999/")
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(client.repo_url(), "http://localhost:9999/repos/octo/demo");
        assert_eq!(
            client.contents_url("/src/main.py"),
            "http://localhost:9999/repos/octo/demo/contents/src/main.py"
        );
    }

    #[test]
    fn test_request_headers() {
        let request = client()
            .request(Method::GET, "http://localhost:9999/x")
            .query(&[("ref", "dev")])
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "http://localhost:9999/x?ref=dev");
        let headers = request.headers();
        assert_eq!(headers["Authorization"], "token ghp_test");
        assert_eq!(headers["Accept"], "application/vnd.github.v3+json");
        assert!(headers["User-Agent"].to_str().unwrap().starts_with("forge/"));
    }

    #[test]
    fn test_encode_content() {
        assert_eq!(encode_content("print(1)"), "cHJpbnQoMSk=");
        assert_eq!(encode_content(""), "");
    }

    #[test]
    fn test_from_config_requires_owner() {
        let mut config = AppConfig::default();
        config.github.token_env = "FORGE_TEST_GITHUB_TOKEN_UNSET".to_string();
        assert!(matches!(
            GitHubClient::from_config(&config),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let client = GitHubClient::new("t", "o", "r")
            .unwrap()
            .with_api_url("http://127.0.0.1:1");
        let result = client.get_file("a.py", "main").await;
        assert!(matches!(result, Err(AppError::GitHub(_))));
    }
}

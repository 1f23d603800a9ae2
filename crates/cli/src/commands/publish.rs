//! Publish command handler.
//!
//! Commits a local file to the configured repository and optionally opens a
//! pull request for it.

use clap::Args;
use forge_core::{config::AppConfig, AppError, AppResult};
use forge_github::GitHubClient;
use std::path::PathBuf;

/// Commit a file to the configured GitHub repository
#[derive(Args, Debug)]
pub struct PublishCommand {
    /// Local file to publish
    #[arg(short, long)]
    pub file: PathBuf,

    /// Destination path in the repository
    #[arg(long)]
    pub path: String,

    /// Commit message
    #[arg(long)]
    pub message: String,

    /// Target branch (default: the configured base branch)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Open a pull request with this title
    #[arg(long)]
    pub pr_title: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PublishCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing publish command for {}", self.file.display());

        let code = std::fs::read_to_string(&self.file).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", self.file.display(), e))
        })?;

        let client = GitHubClient::from_config(config)?;
        let branch = self
            .branch
            .clone()
            .unwrap_or_else(|| client.base_branch().to_string());

        let result = client
            .commit_and_push(&code, &self.path, &self.message, &branch)
            .await?;

        let pull_request = match &self.pr_title {
            Some(title) if branch != client.base_branch() => Some(
                client
                    .create_pull_request(title, &self.message, &branch, client.base_branch())
                    .await?,
            ),
            Some(_) => {
                tracing::warn!("Skipping pull request: {} is the base branch", branch);
                None
            }
            None => None,
        };

        if self.json {
            let output = serde_json::json!({
                "result": result,
                "pullRequest": pull_request.as_ref().map(|pr| serde_json::json!({
                    "number": pr.number,
                    "htmlUrl": pr.html_url,
                })),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Committed {} to {}", result.file_path, result.branch);
            if !result.commit_url.is_empty() {
                println!("  Commit: {}", result.commit_url);
            }
            if !result.file_url.is_empty() {
                println!("  File:   {}", result.file_url);
            }
            if let Some(pr) = pull_request {
                println!(
                    "  Pull request #{}: {}",
                    pr.number,
                    pr.html_url.unwrap_or_default()
                );
            }
        }

        Ok(())
    }
}

//! Request and response bodies of the job API.

use crate::server::tasks::TaskStatus;
use forge_agents::{DEFAULT_DOC_STYLE, DEFAULT_OPTIMIZATION_TARGET};
use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "python".to_string()
}

fn default_true() -> bool {
    true
}

fn default_target() -> String {
    DEFAULT_OPTIMIZATION_TARGET.to_string()
}

fn default_style() -> String {
    DEFAULT_DOC_STYLE.to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCodeRequest {
    pub prompt: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_true")]
    pub debug: bool,
    #[serde(default = "default_true")]
    pub optimize: bool,
    #[serde(default = "default_true")]
    pub document: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugCodeRequest {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub error_messages: Option<Vec<String>>,
}

impl DebugCodeRequest {
    /// Error messages joined one per line.
    pub fn joined_errors(&self) -> Option<String> {
        self.error_messages.as_ref().map(|lines| lines.join("\n"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeCodeRequest {
    pub code: String,
    pub language: String,
    #[serde(default = "default_target")]
    pub optimization_target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentCodeRequest {
    pub code: String,
    pub language: String,
    #[serde(default = "default_style")]
    pub documentation_style: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubIntegrationRequest {
    pub code: String,
    pub file_path: String,
    pub commit_message: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// Reply to every job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: TaskStatus,
}

/// Result of a code-producing job.
#[derive(Debug, Clone, Serialize)]
pub struct CodeResult {
    pub code: String,
    pub language: String,
}

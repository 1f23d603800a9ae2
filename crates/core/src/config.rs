//! Configuration management for Forge.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.forge/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with local state stored in `.forge/`.
//! It is loaded once at startup and handed to every component that needs it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers that have a completion client.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .forge/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("openai" or "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Explicit API key for the completion provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Completion provider configurations
    pub llm: Option<LlmConfig>,

    /// Retrieval store settings
    pub knowledge: KnowledgeSettings,

    /// Publishing settings
    pub github: GitHubSettings,

    /// HTTP server settings
    pub server: ServerSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "organizationEnv")]
        organization_env: Option<String>,
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Model configured for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }

    /// Request timeout in seconds, if configured.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::OpenAI { timeout, .. } | Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Settings for the retrieval store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeSettings {
    /// Store directory; relative paths are resolved against the workspace
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,

    /// Number of documents retrieved per prompt
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from(".forge/vector_db")
}

fn default_top_k() -> usize {
    5
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            top_k: default_top_k(),
            embedding: EmbeddingSettings::default(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// Provider name: "openai", "ollama", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            endpoint: None,
            api_key_env: None,
        }
    }
}

/// Settings for publishing to GitHub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GitHubSettings {
    /// Environment variable holding the access token
    #[serde(rename = "tokenEnv", default = "default_token_env")]
    pub token_env: String,

    /// Repository owner
    #[serde(default)]
    pub owner: Option<String>,

    /// Repository name
    #[serde(default)]
    pub repo: Option<String>,

    /// Branch that new branches are created from
    #[serde(rename = "baseBranch", default = "default_base_branch")]
    pub base_branch: String,

    /// REST API root
    #[serde(rename = "apiUrl", default = "default_api_url")]
    pub api_url: String,
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            owner: None,
            repo: None,
            base_branch: default_base_branch(),
            api_url: default_api_url(),
        }
    }
}

/// Settings for `forge serve`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    knowledge: Option<KnowledgeSettings>,
    github: Option<GitHubSettings>,
    server: Option<ServerSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            knowledge: KnowledgeSettings::default(),
            github: GitHubSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file, and the environment.
    ///
    /// Environment variables:
    /// - `FORGE_WORKSPACE`: Override workspace path
    /// - `FORGE_CONFIG`: Path to config file
    /// - `FORGE_PROVIDER`: Completion provider
    /// - `FORGE_MODEL`: Model identifier
    /// - `FORGE_API_KEY`: API key
    /// - `VECTOR_DB_PATH`: Retrieval store directory
    /// - `GITHUB_OWNER`, `GITHUB_REPO`: Publishing target
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use forge_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("FORGE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("FORGE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.forge_dir().join("config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("FORGE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("FORGE_MODEL") {
            config.model = model;
        }

        if let Ok(path) = std::env::var("VECTOR_DB_PATH") {
            config.knowledge.path = PathBuf::from(path);
        }

        if let Ok(owner) = std::env::var("GITHUB_OWNER") {
            config.github.owner = Some(owner);
        }

        if let Ok(repo) = std::env::var("GITHUB_REPO") {
            config.github.repo = Some(repo);
        }

        config.api_key = std::env::var("FORGE_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }
            result.llm = Some(llm);
        }

        if let Some(knowledge) = config_file.knowledge {
            result.knowledge = knowledge;
        }

        if let Some(github) = config_file.github {
            result.github = github;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .forge directory.
    pub fn forge_dir(&self) -> PathBuf {
        self.workspace.join(".forge")
    }

    /// Ensure the .forge directory exists.
    pub fn ensure_forge_dir(&self) -> AppResult<()> {
        let forge_dir = self.forge_dir();
        if !forge_dir.exists() {
            std::fs::create_dir_all(&forge_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .forge directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Directory of the retrieval store, resolved against the workspace.
    pub fn knowledge_dir(&self) -> PathBuf {
        if self.knowledge.path.is_absolute() {
            self.knowledge.path.clone()
        } else {
            self.workspace.join(&self.knowledge.path)
        }
    }

    /// Get the configuration of a completion provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Custom endpoint of a completion provider, if configured.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint().map(str::to_string))
    }

    /// Request timeout of a completion provider, if configured.
    pub fn resolve_timeout(&self, provider: &str) -> Option<u64> {
        self.get_provider_config(provider).and_then(|pc| pc.timeout())
    }

    /// Resolve the completion API key.
    ///
    /// `FORGE_API_KEY` wins, then the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => Some(api_key_env),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider == "openai" => Some("OPENAI_API_KEY".to_string()),
            None => None,
        };

        env_var.and_then(|var| std::env::var(var).ok())
    }

    /// Resolve the embedding API key.
    ///
    /// Falls back to the completion key when the embedding provider is the
    /// same service.
    pub fn resolve_embedding_api_key(&self) -> Option<String> {
        let embedding = &self.knowledge.embedding;
        if let Some(ref env_var) = embedding.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }
        self.resolve_api_key(&embedding.provider)
    }

    /// Resolve the GitHub access token.
    pub fn resolve_github_token(&self) -> Option<String> {
        std::env::var(&self.github.token_env).ok()
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = &self.provider;

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key(provider).is_none() {
            let env_var = match self.get_provider_config(provider) {
                Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env,
                _ => "OPENAI_API_KEY".to_string(),
            };
            return Err(AppError::Config(format!(
                "API key not found: set FORGE_API_KEY or {}",
                env_var
            )));
        }

        if self.knowledge.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

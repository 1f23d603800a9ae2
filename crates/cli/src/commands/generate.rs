//! Generate command handler.
//!
//! Runs the full pipeline: requirements, code, then the enabled refinement
//! stages.

use crate::app::{build_registry, open_knowledge};
use clap::Args;
use forge_agents::{generate, GenerateRequest};
use forge_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Generate code from a natural-language prompt
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// What the code should do
    pub prompt: String,

    /// Target programming language
    #[arg(short, long, default_value = "python")]
    pub language: String,

    /// Skip the debugging stage
    #[arg(long)]
    pub no_debug: bool,

    /// Skip the optimization stage
    #[arg(long)]
    pub no_optimize: bool,

    /// Skip the documentation stage
    #[arg(long)]
    pub no_document: bool,

    /// Write the code to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing generate command");
        tracing::debug!("Generate options: {:?}", self);

        let registry = build_registry(config, open_knowledge(config)?)?;

        let request = GenerateRequest {
            prompt: self.prompt.clone(),
            language: self.language.clone(),
            debug: !self.no_debug,
            optimize: !self.no_optimize,
            document: !self.no_document,
        };
        let generated = generate(&registry, &request).await?;

        if let Some(path) = &self.output {
            std::fs::write(path, &generated.code).map_err(|e| {
                AppError::Config(format!("Failed to write {}: {}", path.display(), e))
            })?;
            tracing::info!("Wrote code to {}", path.display());
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&generated)?);
        } else if self.output.is_none() {
            println!("{}", generated.code);
        }

        Ok(())
    }
}

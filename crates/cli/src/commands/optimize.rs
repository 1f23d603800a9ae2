//! Optimize command handler.

use crate::app::{build_registry, open_knowledge, read_source};
use clap::Args;
use forge_agents::DEFAULT_OPTIMIZATION_TARGET;
use forge_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Optimize a source file
#[derive(Args, Debug)]
pub struct OptimizeCommand {
    /// Source file to optimize
    #[arg(short, long)]
    pub file: PathBuf,

    /// Programming language (default: inferred from the extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Optimization target (performance, memory, readability)
    #[arg(short, long, default_value = DEFAULT_OPTIMIZATION_TARGET)]
    pub target: String,
}

impl OptimizeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing optimize command for {}", self.file.display());

        let (code, language) = read_source(&self.file, self.language.as_deref())?;
        let registry = build_registry(config, open_knowledge(config)?)?;

        let optimized = registry
            .optimization
            .optimize_code(&code, &language, &self.target)
            .await?;

        println!("{}", optimized);
        Ok(())
    }
}

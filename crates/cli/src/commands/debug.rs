//! Debug command handler.

use crate::app::{build_registry, open_knowledge, read_source};
use clap::Args;
use forge_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Find and fix bugs in a source file
#[derive(Args, Debug)]
pub struct DebugCommand {
    /// Source file to debug
    #[arg(short, long)]
    pub file: PathBuf,

    /// Programming language (default: inferred from the extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Error message observed when running the code (repeatable)
    #[arg(short, long = "error")]
    pub errors: Vec<String>,
}

impl DebugCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing debug command for {}", self.file.display());

        let (code, language) = read_source(&self.file, self.language.as_deref())?;
        let registry = build_registry(config, open_knowledge(config)?)?;

        let errors = self.errors.join("\n");
        let fixed = registry
            .debugging
            .debug_code(&code, &language, Some(errors.as_str()))
            .await?;

        println!("{}", fixed);
        Ok(())
    }
}

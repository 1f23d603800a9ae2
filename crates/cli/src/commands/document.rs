//! Document command handler.

use crate::app::{build_registry, open_knowledge, read_source};
use clap::Args;
use forge_agents::DEFAULT_DOC_STYLE;
use forge_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Add documentation to a source file
#[derive(Args, Debug)]
pub struct DocumentCommand {
    /// Source file to document
    #[arg(short, long)]
    pub file: PathBuf,

    /// Programming language (default: inferred from the extension)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Documentation style (standard, docstring, javadoc)
    #[arg(short, long, default_value = DEFAULT_DOC_STYLE)]
    pub style: String,
}

impl DocumentCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing document command for {}", self.file.display());

        let (code, language) = read_source(&self.file, self.language.as_deref())?;
        let registry = build_registry(config, open_knowledge(config)?)?;

        let documented = registry
            .documentation
            .document_code(&code, &language, &self.style)
            .await?;

        println!("{}", documented);
        Ok(())
    }
}

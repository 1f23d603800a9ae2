//! Serve command handler.

use crate::app::{build_registry, open_knowledge};
use crate::server::{self, AppState};
use clap::Args;
use forge_core::{config::AppConfig, AppResult};
use forge_github::GitHubClient;
use std::sync::Arc;

/// Run the HTTP job server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Socket address to bind (default: server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let registry = build_registry(config, open_knowledge(config)?)?;

        let github = match GitHubClient::from_config(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("GitHub integration disabled: {}", e);
                None
            }
        };

        let state = AppState::new(Arc::new(registry), github);
        let bind = self.bind.as_deref().unwrap_or(&config.server.bind);
        server::serve(state, bind).await
    }
}

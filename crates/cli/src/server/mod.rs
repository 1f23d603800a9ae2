//! HTTP job server.

pub mod models;
pub mod routes;
pub mod tasks;


pub use routes::router;

use forge_agents::AgentRegistry;
use forge_core::{AppError, AppResult};
use forge_github::GitHubClient;
use std::sync::Arc;
use tasks::TaskStore;

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub github: Option<Arc<GitHubClient>>,
    pub tasks: Arc<TaskStore>,
}

impl AppState {
    pub fn new(registry: Arc<AgentRegistry>, github: Option<Arc<GitHubClient>>) -> Self {
        Self {
            registry,
            github,
            tasks: Arc::new(TaskStore::new()),
        }
    }
}

/// Bind `bind` and serve until the process exits.
pub async fn serve(state: AppState, bind: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind, e)))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Serving job API on http://{}/api", local_addr);
    println!("Serving job API: http://{}/api", local_addr);
    println!("Try: curl http://{}/", local_addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

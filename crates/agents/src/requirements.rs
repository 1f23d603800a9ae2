//! Requirements analysis agent.

use crate::executor::PromptExecutor;
use forge_core::AppResult;
use forge_prompt::{PromptCatalog, PromptDefinition, REQUIREMENTS_PROMPT};
use std::collections::HashMap;

/// Turns a natural-language request into a requirements document.
#[derive(Debug, Clone)]
pub struct RequirementsAgent {
    executor: PromptExecutor,
    definition: PromptDefinition,
}

impl RequirementsAgent {
    pub fn new(executor: PromptExecutor, catalog: &PromptCatalog) -> AppResult<Self> {
        Ok(Self {
            executor,
            definition: catalog.get(REQUIREMENTS_PROMPT)?.clone(),
        })
    }

    /// Returns the model's response as is.
    pub async fn process_requirements(&self, prompt: &str) -> AppResult<String> {
        tracing::info!("Processing requirements");

        let mut variables = HashMap::new();
        variables.insert("prompt".to_string(), prompt.to_string());

        let requirements = self.executor.run(&self.definition, variables).await?;
        tracing::debug!("Generated requirements ({} bytes)", requirements.len());
        Ok(requirements)
    }
}

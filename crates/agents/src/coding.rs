//! Code generation agent.

use crate::executor::PromptExecutor;
use forge_core::AppResult;
use forge_prompt::{PromptCatalog, PromptDefinition, CODING_PROMPT};
use std::collections::HashMap;

/// Length of the requirements excerpt used to seed retrieval.
const REQUIREMENTS_HEAD_CHARS: usize = 100;

/// Writes code that implements a requirements document.
#[derive(Debug, Clone)]
pub struct CodingAgent {
    executor: PromptExecutor,
    definition: PromptDefinition,
}

impl CodingAgent {
    pub fn new(executor: PromptExecutor, catalog: &PromptCatalog) -> AppResult<Self> {
        Ok(Self {
            executor,
            definition: catalog.get(CODING_PROMPT)?.clone(),
        })
    }

    pub async fn generate_code(&self, requirements: &str, language: &str) -> AppResult<String> {
        tracing::info!("Generating {} code", language);

        let head: String = requirements.chars().take(REQUIREMENTS_HEAD_CHARS).collect();

        let mut variables = HashMap::new();
        variables.insert("language".to_string(), language.to_string());
        variables.insert("requirements".to_string(), requirements.to_string());
        variables.insert("requirementsHead".to_string(), head);

        let code = self.executor.run(&self.definition, variables).await?;
        tracing::debug!("Generated code ({} bytes)", code.len());
        Ok(code)
    }
}

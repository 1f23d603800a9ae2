//! Debugging agent.

use crate::executor::PromptExecutor;
use forge_core::AppResult;
use forge_prompt::{PromptCatalog, PromptDefinition, DEBUGGING_PROMPT};
use std::collections::HashMap;

/// Finds and fixes bugs, returning corrected code.
#[derive(Debug, Clone)]
pub struct DebuggingAgent {
    executor: PromptExecutor,
    definition: PromptDefinition,
}

impl DebuggingAgent {
    pub fn new(executor: PromptExecutor, catalog: &PromptCatalog) -> AppResult<Self> {
        Ok(Self {
            executor,
            definition: catalog.get(DEBUGGING_PROMPT)?.clone(),
        })
    }

    /// `error_messages` are shown to the model verbatim when present.
    pub async fn debug_code(
        &self,
        code: &str,
        language: &str,
        error_messages: Option<&str>,
    ) -> AppResult<String> {
        tracing::info!("Debugging {} code", language);

        let mut variables = HashMap::new();
        variables.insert("language".to_string(), language.to_string());
        variables.insert("code".to_string(), code.to_string());
        if let Some(errors) = error_messages.filter(|e| !e.trim().is_empty()) {
            variables.insert("errorMessages".to_string(), errors.to_string());
        }

        let fixed = self.executor.run(&self.definition, variables).await?;
        tracing::debug!("Debugged code ({} bytes)", fixed.len());
        Ok(fixed)
    }
}

//! Optimization agent.

use crate::executor::PromptExecutor;
use forge_core::AppResult;
use forge_prompt::{PromptCatalog, PromptDefinition, OPTIMIZATION_PROMPT};
use std::collections::HashMap;

pub const DEFAULT_OPTIMIZATION_TARGET: &str = "performance";

/// Guideline line for a known optimization target.
pub fn guideline_for(target: &str) -> Option<&'static str> {
    match target {
        "performance" => Some("Improve time complexity and algorithmic efficiency"),
        "memory" => Some("Reduce memory usage and optimize space complexity"),
        "readability" => Some("Enhance readability, maintainability, and code organization"),
        _ => None,
    }
}

/// Rewrites code for a target without changing behavior.
#[derive(Debug, Clone)]
pub struct OptimizationAgent {
    executor: PromptExecutor,
    definition: PromptDefinition,
}

impl OptimizationAgent {
    pub fn new(executor: PromptExecutor, catalog: &PromptCatalog) -> AppResult<Self> {
        Ok(Self {
            executor,
            definition: catalog.get(OPTIMIZATION_PROMPT)?.clone(),
        })
    }

    /// Unknown targets are passed through without a guideline.
    pub async fn optimize_code(&self, code: &str, language: &str, target: &str) -> AppResult<String> {
        tracing::info!("Optimizing {} code for {}", language, target);

        let mut variables = HashMap::new();
        variables.insert("language".to_string(), language.to_string());
        variables.insert("code".to_string(), code.to_string());
        variables.insert("target".to_string(), target.to_string());
        if let Some(guideline) = guideline_for(target) {
            variables.insert("guideline".to_string(), guideline.to_string());
        }

        let optimized = self.executor.run(&self.definition, variables).await?;
        tracing::debug!("Optimized code ({} bytes)", optimized.len());
        Ok(optimized)
    }
}

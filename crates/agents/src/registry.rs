//! Construction of the agent set.

use crate::coding::CodingAgent;
use crate::debugging::DebuggingAgent;
use crate::documentation::DocumentationAgent;
use crate::executor::PromptExecutor;
use crate::optimization::OptimizationAgent;
use crate::requirements::RequirementsAgent;
use forge_core::{AppConfig, AppResult};
use forge_knowledge::KnowledgeBase;
use forge_llm::{create_client_from_config, LlmClient};
use forge_prompt::PromptCatalog;
use std::sync::Arc;

/// The five agents, sharing one completion client and knowledge base.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    pub requirements: RequirementsAgent,
    pub coding: CodingAgent,
    pub debugging: DebuggingAgent,
    pub optimization: OptimizationAgent,
    pub documentation: DocumentationAgent,
}

impl AgentRegistry {
    pub fn new(executor: PromptExecutor, catalog: &PromptCatalog) -> AppResult<Self> {
        Ok(Self {
            requirements: RequirementsAgent::new(executor.clone(), catalog)?,
            coding: CodingAgent::new(executor.clone(), catalog)?,
            debugging: DebuggingAgent::new(executor.clone(), catalog)?,
            optimization: OptimizationAgent::new(executor.clone(), catalog)?,
            documentation: DocumentationAgent::new(executor, catalog)?,
        })
    }

    /// Build every agent from application configuration.
    ///
    /// Prompts come from the built-ins plus workspace overrides.
    pub fn from_config(
        config: &AppConfig,
        llm: Option<Arc<dyn LlmClient>>,
        knowledge: Option<Arc<KnowledgeBase>>,
    ) -> AppResult<Self> {
        let llm = match llm {
            Some(llm) => llm,
            None => create_client_from_config(config)?,
        };
        let catalog = PromptCatalog::load(&config.workspace)?;
        let executor = PromptExecutor::new(llm, knowledge, config.model.clone());
        Self::new(executor, &catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubLlm;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_workspace_prompt_override() {
        let temp = TempDir::new().unwrap();
        let prompts = temp.path().join(".forge/prompts");
        std::fs::create_dir_all(&prompts).unwrap();
        std::fs::write(
            prompts.join("agent.requirements.yml"),
            r#"
id: agent.requirements
title: Terse requirements
apiVersion: "1.0"
system: Be brief.
template: "Requirements for: {{prompt}}"
sampling:
  temperature: 0.5
  maxTokens: 100
output:
  format: text
"#,
        )
        .unwrap();

        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            model: "llama3.2".to_string(),
            ..AppConfig::default()
        };
        let llm = StubLlm::replying("done");
        let registry = AgentRegistry::from_config(&config, Some(llm.clone() as Arc<dyn LlmClient>), None).unwrap();

        registry.requirements.process_requirements("a CLI").await.unwrap();

        let request = llm.last_request();
        assert_eq!(request.model, "llama3.2");
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.messages[0].content, "Be brief.");
        assert_eq!(request.messages[1].content, "Requirements for: a CLI");
    }
}

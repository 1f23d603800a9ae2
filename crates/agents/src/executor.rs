//! Retrieve, render, complete, extract.
//!
//! Every agent runs its prompt definition through [`PromptExecutor::run`].

use crate::extract::extract_first_code_block;
use forge_core::AppResult;
use forge_knowledge::KnowledgeBase;
use forge_llm::{LlmClient, LlmRequest};
use forge_prompt::{build_prompt, render_query, OutputFormat, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared call-and-parse pattern of all agents.
#[derive(Clone)]
pub struct PromptExecutor {
    llm: Arc<dyn LlmClient>,
    knowledge: Option<Arc<KnowledgeBase>>,
    model: String,
}

impl std::fmt::Debug for PromptExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptExecutor")
            .field("provider", &self.llm.provider_name())
            .field("knowledge", &self.knowledge.is_some())
            .field("model", &self.model)
            .finish()
    }
}

impl PromptExecutor {
    /// Without a knowledge base, retrieval is skipped.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        knowledge: Option<Arc<KnowledgeBase>>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            knowledge,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn knowledge(&self) -> Option<&Arc<KnowledgeBase>> {
        self.knowledge.as_ref()
    }

    /// Run one prompt definition and return the model's text.
    ///
    /// Code-format prompts return the first fenced block, matched against
    /// the `language` variable.
    pub async fn run(
        &self,
        definition: &PromptDefinition,
        variables: HashMap<String, String>,
    ) -> AppResult<String> {
        let context = self.retrieve(definition, &variables).await?;

        let built = build_prompt(definition, variables, context)?;
        tracing::debug!(
            prompt = %built.metadata.source_prompt_id,
            knowledge = built.metadata.knowledge_context_included,
            "Built prompt"
        );

        let mut request = LlmRequest::new(&self.model)
            .with_system(built.system)
            .with_user(built.user)
            .with_temperature(definition.sampling.temperature)
            .with_max_tokens(definition.sampling.max_tokens);
        if let Some(top_p) = definition.sampling.top_p {
            request = request.with_top_p(top_p);
        }

        let response = self.llm.complete(&request).await?;
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        );

        let output = match definition.output.format {
            OutputFormat::Text => response.content,
            OutputFormat::Code => {
                let language = built
                    .metadata
                    .resolved_variables
                    .get("language")
                    .map(String::as_str)
                    .unwrap_or_default();
                extract_first_code_block(&response.content, language)
            }
        };

        Ok(output)
    }

    async fn retrieve(
        &self,
        definition: &PromptDefinition,
        variables: &HashMap<String, String>,
    ) -> AppResult<Option<String>> {
        let Some(knowledge) = &self.knowledge else {
            return Ok(None);
        };
        let Some(seed) = render_query(definition, variables)? else {
            return Ok(None);
        };

        tracing::debug!("Retrieving context for '{}'", seed);
        let context = knowledge.query(&seed, definition.retrieval.top_k).await?;
        Ok(Some(context))
    }
}

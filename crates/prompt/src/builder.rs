//! Prompt builder for rendering templates and injecting retrieved context.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use forge_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Variable that receives retrieved context.
pub const KNOWLEDGE_CONTEXT_VAR: &str = "knowledgeContext";

/// Build a prompt from a definition and input variables.
///
/// This function:
/// 1. Injects `knowledgeContext` when the retrieved context is non-empty
/// 2. Renders the system and user templates with Handlebars
/// 3. Returns a `BuiltPrompt` ready for LLM execution
///
/// # Example
/// ```no_run
/// use forge_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("prompt".to_string(), "A CLI that counts words".to_string());
///
/// let built = build_prompt(&def, vars, None)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    mut variables: HashMap<String, String>,
    knowledge_context: Option<String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let knowledge_context_included = match knowledge_context {
        Some(ctx) if !ctx.trim().is_empty() => {
            variables.insert(KNOWLEDGE_CONTEXT_VAR.to_string(), ctx);
            true
        }
        _ => {
            variables.remove(KNOWLEDGE_CONTEXT_VAR);
            false
        }
    };

    let system = render_template(&definition.system, &variables)?;
    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        system: system.trim().to_string(),
        user: user.trim().to_string(),
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            knowledge_context_included,
            resolved_variables: variables,
        },
    })
}

/// Render the retrieval seed text, or `None` when retrieval is disabled.
pub fn render_query(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<Option<String>> {
    if !definition.retrieval.enabled {
        return Ok(None);
    }
    render_template(&definition.retrieval.query, variables).map(Some)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

//! End-to-end generation: requirements, code, then optional refinement.

use crate::documentation::DEFAULT_DOC_STYLE;
use crate::optimization::DEFAULT_OPTIMIZATION_TARGET;
use crate::registry::AgentRegistry;
use forge_core::AppResult;
use serde::{Deserialize, Serialize};

/// Options for one generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub language: String,
    pub debug: bool,
    pub optimize: bool,
    pub document: bool,
}

impl GenerateRequest {
    /// All refinement stages enabled.
    pub fn new(prompt: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: language.into(),
            debug: true,
            optimize: true,
            document: true,
        }
    }
}

/// Result of a generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub requirements: String,
    pub code: String,
    pub language: String,
}

/// Run the stages in order, each consuming the previous stage's code.
pub async fn generate(registry: &AgentRegistry, request: &GenerateRequest) -> AppResult<GeneratedCode> {
    let language = request.language.as_str();

    let requirements = registry
        .requirements
        .process_requirements(&request.prompt)
        .await?;

    let mut code = registry.coding.generate_code(&requirements, language).await?;

    if request.debug {
        code = registry.debugging.debug_code(&code, language, None).await?;
    }

    if request.optimize {
        code = registry
            .optimization
            .optimize_code(&code, language, DEFAULT_OPTIMIZATION_TARGET)
            .await?;
    }

    if request.document {
        code = registry
            .documentation
            .document_code(&code, language, DEFAULT_DOC_STYLE)
            .await?;
    }

    tracing::info!("Generated {} bytes of {} code", code.len(), language);

    Ok(GeneratedCode {
        requirements,
        code,
        language: request.language.clone(),
    })
}

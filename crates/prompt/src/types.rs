//! Prompt types for Forge.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Short description shown by listings
    #[serde(default)]
    pub description: String,

    /// System message template with Handlebars syntax
    #[serde(default)]
    pub system: String,

    /// User message template with Handlebars syntax
    pub template: String,

    /// Completion settings
    pub sampling: SamplingSpec,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalSpec,

    /// Output specification
    pub output: PromptOutputSpec,
}

/// Completion settings for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingSpec {
    pub temperature: f32,

    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,

    /// Nucleus sampling; omitted from the request when unset
    #[serde(rename = "topP", default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

/// How the knowledge store is queried before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSpec {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seed text template rendered with the same variables as the prompt
    #[serde(default)]
    pub query: String,

    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_top_k() -> usize {
    5
}

impl Default for RetrievalSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            query: String::new(),
            top_k: default_top_k(),
        }
    }
}

/// Output specification for the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    pub format: OutputFormat,
}

/// Shape of the completion text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Returned verbatim
    Text,
    /// First fenced block is extracted
    Code,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message
    pub system: String,

    /// User message
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Whether retrieved context was injected
    #[serde(rename = "knowledgeContextIncluded")]
    pub knowledge_context_included: bool,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

//! Prompt system for Forge.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, compiled-in defaults and workspace overrides
//! - Handlebars template rendering
//! - Retrieved context injection

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, render_query};
pub use loader::{
    list_prompts, load_prompt, PromptCatalog, CODING_PROMPT, DEBUGGING_PROMPT,
    DOCUMENTATION_PROMPT, OPTIMIZATION_PROMPT, REQUIREMENTS_PROMPT,
};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, OutputFormat, PromptDefinition, PromptOutputSpec,
    RetrievalSpec, SamplingSpec,
};

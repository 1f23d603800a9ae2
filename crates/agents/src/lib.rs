//! Code-generation agents for Forge.
//!
//! Each agent is a prompt definition run through one shared executor:
//! retrieve context, render the prompt, call the model, extract the code.
//! The agents hold no state between calls.

pub mod coding;
pub mod debugging;
pub mod documentation;
pub mod executor;
pub mod extract;
pub mod optimization;
pub mod pipeline;
pub mod registry;
pub mod requirements;

#[cfg(test)]
mod testing;

pub use coding::CodingAgent;
pub use debugging::DebuggingAgent;
pub use documentation::{resolve_doc_style, DocumentationAgent, DEFAULT_DOC_STYLE};
pub use executor::PromptExecutor;
pub use extract::extract_first_code_block;
pub use optimization::{guideline_for, OptimizationAgent, DEFAULT_OPTIMIZATION_TARGET};
pub use pipeline::{generate, GenerateRequest, GeneratedCode};
pub use registry::AgentRegistry;
pub use requirements::RequirementsAgent;

//! Command handlers for the Forge CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod debug;
pub mod document;
pub mod generate;
pub mod knowledge;
pub mod optimize;
pub mod publish;
pub mod serve;

pub use debug::DebugCommand;
pub use document::DocumentCommand;
pub use generate::GenerateCommand;
pub use knowledge::KnowledgeCommand;
pub use optimize::OptimizeCommand;
pub use publish::PublishCommand;
pub use serve::ServeCommand;

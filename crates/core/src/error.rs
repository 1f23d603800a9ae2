//! Error types for Forge.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM and embedding providers,
//! the knowledge store, prompts, GitHub publishing, and background tasks.

use thiserror::Error;

/// Unified error type for Forge.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Knowledge store errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// The vector index and the document store disagree with each other.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Source-control host errors
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// Background task errors
    #[error("Task error: {0}")]
    Task(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

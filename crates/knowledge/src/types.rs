//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use forge_core::AppConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Options for opening a knowledge store.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBaseConfig {
    /// Store directory holding `index.vec`, `documents.sqlite` and `config.yaml`
    pub dir: PathBuf,

    /// Number of documents retrieved when the caller does not say
    pub top_k: usize,
}

impl KnowledgeBaseConfig {
    /// Derive the store options from application configuration.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            dir: config.knowledge_dir(),
            top_k: config.knowledge.top_k,
        }
    }
}

/// A stored text document.
///
/// `id` equals the document's position in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,

    pub content: String,

    /// Caller-supplied JSON object
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// One result of a nearest-neighbor search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Squared Euclidean distance to the query vector
    pub distance: f32,

    pub document: Document,
}

/// Statistics for a knowledge store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    /// Store directory
    pub path: PathBuf,

    /// Number of documents
    pub documents: usize,

    /// Embedding vector dimension
    pub dimension: usize,

    /// Embedding provider name
    pub provider: String,

    /// Embedding model
    pub model: String,

    /// Size of `index.vec` in bytes
    pub index_size_bytes: u64,

    /// Size of `documents.sqlite` in bytes
    pub documents_size_bytes: u64,

    /// Last time the index was written
    pub last_modified: Option<DateTime<Utc>>,
}

//! Knowledge store for retrieval-grounded prompts.
//!
//! A store is a flat L2 vector index and a SQLite document table kept in
//! lockstep: the vector at position `i` belongs to the document with id `i`.
//! Both are flushed to disk after every mutation.

pub mod config;
pub mod context;
pub mod embeddings;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use types::{BaseStats, Document, KnowledgeBaseConfig, SearchHit};
pub use vector_index::{FlatL2Index, VectorIndex};

use chrono::{DateTime, Utc};
use forge_core::{AppConfig, AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use store::DocumentStore;
use tokio::sync::Mutex;

/// Index and documents, guarded together.
struct IndexState {
    index: FlatL2Index,
    docs: DocumentStore,
}

/// Persistent nearest-neighbor store of text documents.
pub struct KnowledgeBase {
    dir: PathBuf,
    provider: Arc<dyn EmbeddingProvider>,
    state: Mutex<IndexState>,
    top_k: usize,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("dir", &self.dir)
            .field("provider", &self.provider.provider_name())
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl KnowledgeBase {
    /// Open the store in `config.dir`, creating it when absent.
    ///
    /// Fails with `CorruptIndex` when only one of the data files exists or
    /// when the two disagree, and with a knowledge error when the recorded
    /// embedding settings differ from the provider's.
    pub fn open(config: &KnowledgeBaseConfig, provider: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let dir = config.dir.clone();
        config::ensure_store_dir(&dir)?;

        let embedding = provider.config();
        let recorded = EmbeddingConfig::load(&dir)?;
        if let Some(recorded) = &recorded {
            recorded.validate_consistency(&embedding)?;
        }

        let index_path = config::get_index_path(&dir);
        let documents_path = config::get_documents_path(&dir);

        let state = match (index_path.exists(), documents_path.exists()) {
            (false, false) => {
                tracing::info!("Creating knowledge store at {:?}", dir);
                let docs = DocumentStore::open(&documents_path)?;
                let index = FlatL2Index::new(embedding.dimensions);
                index.save(&index_path)?;
                IndexState { index, docs }
            }
            (true, true) => {
                let index = FlatL2Index::load(&index_path)?;
                let docs = DocumentStore::open(&documents_path)?;
                verify_state(&index, &docs, embedding.dimensions)?;
                tracing::debug!("Opened knowledge store at {:?} ({} documents)", dir, docs.len());
                IndexState { index, docs }
            }
            (true, false) => {
                return Err(AppError::CorruptIndex(format!(
                    "{:?} exists but {:?} is missing",
                    index_path, documents_path
                )))
            }
            (false, true) => {
                return Err(AppError::CorruptIndex(format!(
                    "{:?} exists but {:?} is missing",
                    documents_path, index_path
                )))
            }
        };

        if recorded.is_none() {
            embedding.save(&dir)?;
        }

        Ok(Self {
            dir,
            provider,
            state: Mutex::new(state),
            top_k: config.top_k,
        })
    }

    /// Open the store configured in `config`, building its embedding provider.
    pub fn open_from_app_config(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.resolve_embedding_api_key();
        let provider = create_provider(&config.knowledge.embedding, api_key.as_deref())?;
        Self::open(&KnowledgeBaseConfig::from_app_config(config), provider)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_top_k(&self) -> usize {
        self.top_k
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.docs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Embed and store `content`, returning its id.
    pub async fn add(&self, content: &str, metadata: Option<serde_json::Value>) -> AppResult<u64> {
        if content.trim().is_empty() {
            return Err(AppError::Knowledge("Cannot add empty content".to_string()));
        }

        let vector = self.provider.embed(content).await?;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let position = state.index.add(&vector)?;
        if position != state.docs.len() {
            state.index.truncate(state.docs.len());
            return Err(AppError::CorruptIndex(format!(
                "index has {} vectors but store has {} documents",
                position,
                state.docs.len()
            )));
        }

        let document = Document {
            id: position as u64,
            content: content.to_string(),
            metadata: metadata.unwrap_or_else(|| serde_json::json!({})),
        };

        let index_path = config::get_index_path(&self.dir);
        let index = &state.index;
        let result = state.docs.append(document, || index.save(&index_path));

        if let Err(err) = result {
            state.index.truncate(position);
            if let Err(resave) = state.index.save(&index_path) {
                tracing::warn!("Failed to restore index after rollback: {}", resave);
            }
            return Err(err);
        }

        tracing::debug!("Added document {} ({} bytes)", position, content.len());
        Ok(position as u64)
    }

    /// Up to `k` stored documents nearest to `text`, nearest first.
    pub async fn search(&self, text: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        if k == 0 || self.is_empty().await {
            return Ok(Vec::new());
        }

        let vector = self.provider.embed(text).await?;

        let state = self.state.lock().await;
        let hits = state.index.search(&vector, k)?;

        hits.into_iter()
            .map(|(position, distance)| {
                let document = state.docs.get(position).cloned().ok_or_else(|| {
                    AppError::CorruptIndex(format!("no document at position {}", position))
                })?;
                Ok(SearchHit { distance, document })
            })
            .collect()
    }

    /// Context block of the `k` documents nearest to `text`.
    ///
    /// Empty when the store is empty.
    pub async fn query(&self, text: &str, k: usize) -> AppResult<String> {
        let hits = self.search(text, k).await?;
        tracing::debug!("Retrieved {} documents", hits.len());
        Ok(context::format_context(&hits))
    }

    /// Remove every document. Clearing an empty store is a no-op write.
    pub async fn clear(&self) -> AppResult<()> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let empty = FlatL2Index::new(state.index.dimension());
        let index_path = config::get_index_path(&self.dir);

        if let Err(err) = state.docs.clear(|| empty.save(&index_path)) {
            // The empty index may already be on disk; put the live one back.
            if let Err(resave) = state.index.save(&index_path) {
                tracing::warn!("Failed to restore index after failed clear: {}", resave);
            }
            return Err(err);
        }
        state.index.reset();

        tracing::info!("Cleared knowledge store at {:?}", self.dir);
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<BaseStats> {
        let state = self.state.lock().await;
        let index_path = config::get_index_path(&self.dir);

        let last_modified = std::fs::metadata(&index_path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        Ok(BaseStats {
            path: self.dir.clone(),
            documents: state.docs.len(),
            dimension: state.index.dimension(),
            provider: self.provider.provider_name().to_string(),
            model: self.provider.model_name().to_string(),
            index_size_bytes: config::file_size(&index_path),
            documents_size_bytes: config::file_size(&config::get_documents_path(&self.dir)),
            last_modified,
        })
    }
}

fn verify_state(index: &FlatL2Index, docs: &DocumentStore, dimension: usize) -> AppResult<()> {
    if index.dimension() != dimension {
        return Err(AppError::CorruptIndex(format!(
            "index dimension is {}, embeddings have {}",
            index.dimension(),
            dimension
        )));
    }

    if index.len() != docs.len() {
        return Err(AppError::CorruptIndex(format!(
            "index has {} vectors but store has {} documents",
            index.len(),
            docs.len()
        )));
    }

    if let Some((position, doc)) = docs
        .documents()
        .iter()
        .enumerate()
        .find(|(position, doc)| doc.id != *position as u64)
    {
        return Err(AppError::CorruptIndex(format!(
            "document at position {} has id {}",
            position, doc.id
        )));
    }

    Ok(())
}

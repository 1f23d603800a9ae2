//! Embedding providers and fixtures shared by the store tests.

use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::{KnowledgeBase, KnowledgeBaseConfig};
use forge_core::AppResult;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Provider returning hand-picked vectors, counting every text it embeds.
#[derive(Debug)]
pub struct FixedProvider {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedProvider {
    pub fn new(entries: &[(&str, [f32; 2])]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.to_vec()))
                .collect(),
            fallback: vec![0.0, 0.0],
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FixedProvider {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    fn model_name(&self) -> &str {
        "fixed-2d"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| self.vectors.get(t).unwrap_or(&self.fallback).clone())
            .collect())
    }
}

pub fn store_config(dir: &Path) -> KnowledgeBaseConfig {
    KnowledgeBaseConfig {
        dir: dir.to_path_buf(),
        top_k: 5,
    }
}

pub fn open_fixed(dir: &Path, provider: Arc<FixedProvider>) -> KnowledgeBase {
    KnowledgeBase::open(&store_config(dir), provider).unwrap()
}

pub fn open_trigram(dir: &Path, dimensions: usize) -> KnowledgeBase {
    KnowledgeBase::open(
        &store_config(dir),
        Arc::new(TrigramProvider::new(dimensions)),
    )
    .unwrap()
}

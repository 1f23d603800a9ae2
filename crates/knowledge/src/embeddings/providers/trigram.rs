//! Trigram embedding provider: deterministic, offline, content-aware vectors.

use crate::embeddings::provider::EmbeddingProvider;
use forge_core::AppResult;
use std::collections::HashMap;

const MODEL: &str = "trigram-v1";

/// Trigram-based embedding provider for local, offline operation.
///
/// Each identifier-like token contributes its padded character trigrams and a
/// whole-token feature, hashed into the vector and unit-normalized. Similar
/// snippets share trigrams and land close together; nothing is semantic.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(&self, feature: &str, salt: u64) -> usize {
        (fnv1a(feature.as_bytes(), salt) % self.dimensions as u64) as usize
    }

    fn generate_trigram_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let mut token_freq: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *token_freq.entry(token).or_insert(0) += 1;
        }

        for (token, freq) in &token_freq {
            let weight = (*freq as f32).sqrt();
            let padded: Vec<char> = format!(" {} ", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(&trigram, 0)] += weight;
            }

            embedding[self.bucket(token, 1)] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

/// Lowercased runs of alphanumerics and underscores.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8], salt: u64) -> u64 {
    let mut hash = 0xcbf29ce484222325u64 ^ salt;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_trigram_embedding(text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    fn l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[tokio::test]
    async fn test_trigram_provider_embed_single() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("fn parse_config(path: &Path)").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_trigram_provider_deterministic() {
        let provider = TrigramProvider::new(128);
        let text = "def retry(fn, attempts=3):";

        let embedding1 = provider.embed(text).await.unwrap();
        let embedding2 = provider.embed(text).await.unwrap();
        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_similar_text_is_closer() {
        let provider = TrigramProvider::new(256);
        let query = provider.embed("read a csv file in python").await.unwrap();
        let near = provider.embed("python csv reader example").await.unwrap();
        let far = provider.embed("rust tokio tcp listener").await.unwrap();

        assert!(l2(&query, &near) < l2(&query, &far));
    }

    #[tokio::test]
    async fn test_trigram_provider_empty_text() {
        let provider = TrigramProvider::new(64);
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 64);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_trigram_provider_utf8_safety() {
        let provider = TrigramProvider::new(384);
        let embedding = provider
            .embed("Gamedex é um aplicativo 🎮 brasileiro para gerenciar jogos!")
            .await
            .unwrap();

        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_tokenize_splits_code() {
        let tokens: Vec<String> = tokenize("self.max_tokens = Config::Default()").collect();
        assert_eq!(tokens, vec!["self", "max_tokens", "config", "default"]);
    }
}

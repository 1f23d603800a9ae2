//! Test doubles shared by the agent tests.

use async_trait::async_trait;
use forge_core::{AppError, AppResult};
use forge_knowledge::embeddings::providers::TrigramProvider;
use forge_knowledge::{KnowledgeBase, KnowledgeBaseConfig};
use forge_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Completion client that records requests and plays back canned replies.
///
/// Scripted replies are consumed in order; after that the fallback repeats.
pub struct StubLlm {
    scripted: Mutex<VecDeque<String>>,
    fallback: Result<String, String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl StubLlm {
    pub fn replying(reply: &str) -> Arc<Self> {
        Self::scripted(&[], reply)
    }

    pub fn scripted(replies: &[&str], fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            scripted: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            fallback: Ok(fallback.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> LlmRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    /// User message of the `n`th request.
    pub fn user_message(&self, n: usize) -> String {
        self.requests()[n].messages[1].content.clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    fn provider_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let reply = match self.scripted.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => self.fallback.clone().map_err(AppError::Llm)?,
        };

        Ok(LlmResponse {
            content: reply,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 20),
        })
    }
}

/// Empty knowledge base with the offline trigram provider.
pub fn open_knowledge(dir: &Path) -> Arc<KnowledgeBase> {
    let config = KnowledgeBaseConfig {
        dir: dir.to_path_buf(),
        top_k: 5,
    };
    Arc::new(KnowledgeBase::open(&config, Arc::new(TrigramProvider::new(64))).unwrap())
}

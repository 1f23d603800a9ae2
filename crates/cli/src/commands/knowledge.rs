//! Knowledge command handler.
//!
//! Manages the retrieval store that grounds every prompt.

use clap::{Args, Subcommand};
use forge_core::{config::AppConfig, AppError, AppResult};
use forge_knowledge::KnowledgeBase;
use std::path::PathBuf;

/// Retrieval store management
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// Add a document to the store
    Add(KnowledgeAddCommand),
    /// Show the documents nearest to a query
    Query(KnowledgeQueryCommand),
    /// Remove every document
    Clear(KnowledgeClearCommand),
    /// Show store statistics
    Stats(KnowledgeStatsCommand),
}

impl KnowledgeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let kb = KnowledgeBase::open_from_app_config(config)?;
        match &self.action {
            KnowledgeAction::Add(cmd) => cmd.execute(&kb).await,
            KnowledgeAction::Query(cmd) => cmd.execute(&kb).await,
            KnowledgeAction::Clear(cmd) => cmd.execute(&kb).await,
            KnowledgeAction::Stats(cmd) => cmd.execute(&kb).await,
        }
    }
}

/// Add a document
#[derive(Args, Debug)]
pub struct KnowledgeAddCommand {
    /// Document text
    pub text: Option<String>,

    /// Read the document text from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Metadata entry as key=value (repeatable)
    #[arg(long = "meta", value_parser = parse_meta)]
    pub meta: Vec<(String, String)>,
}

fn parse_meta(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

impl KnowledgeAddCommand {
    pub async fn execute(&self, kb: &KnowledgeBase) -> AppResult<()> {
        tracing::info!("Executing knowledge add command");

        let (content, source) = match (&self.text, &self.file) {
            (Some(text), _) => (text.clone(), None),
            (None, Some(path)) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                (content, Some(path.display().to_string()))
            }
            (None, None) => {
                return Err(AppError::Config(
                    "Provide document text or --file".to_string(),
                ))
            }
        };

        let mut metadata = serde_json::Map::new();
        if let Some(source) = source {
            metadata.insert("source".to_string(), serde_json::Value::String(source));
        }
        for (key, value) in &self.meta {
            metadata.insert(key.clone(), serde_json::Value::String(value.clone()));
        }

        let id = kb
            .add(&content, Some(serde_json::Value::Object(metadata)))
            .await?;
        println!("Added document {}", id);
        Ok(())
    }
}

/// Query the store
#[derive(Args, Debug)]
pub struct KnowledgeQueryCommand {
    /// Query text
    pub query: String,

    /// Number of documents to retrieve (default: knowledge.topK)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeQueryCommand {
    pub async fn execute(&self, kb: &KnowledgeBase) -> AppResult<()> {
        tracing::info!("Executing knowledge query command");

        let k = self.top_k.unwrap_or_else(|| kb.default_top_k());
        let hits = kb.search(&self.query, k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&hits)?);
            return Ok(());
        }

        if hits.is_empty() {
            println!("No documents found");
            return Ok(());
        }

        for (i, hit) in hits.iter().enumerate() {
            println!(
                "[{}] id={} distance={:.4}",
                i + 1,
                hit.document.id,
                hit.distance
            );
            println!("{}\n", hit.document.content);
        }

        Ok(())
    }
}

/// Clear the store
#[derive(Args, Debug)]
pub struct KnowledgeClearCommand {}

impl KnowledgeClearCommand {
    pub async fn execute(&self, kb: &KnowledgeBase) -> AppResult<()> {
        tracing::info!("Executing knowledge clear command");
        kb.clear().await?;
        println!("Cleared knowledge store at {}", kb.dir().display());
        Ok(())
    }
}

/// Show statistics
#[derive(Args, Debug)]
pub struct KnowledgeStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeStatsCommand {
    pub async fn execute(&self, kb: &KnowledgeBase) -> AppResult<()> {
        tracing::info!("Executing knowledge stats command");

        let stats = kb.stats().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Knowledge store: {}", stats.path.display());
            println!("  Documents:  {}", stats.documents);
            println!("  Embeddings: {} / {} ({} dims)", stats.provider, stats.model, stats.dimension);
            println!("  Index size: {} bytes", stats.index_size_bytes);
            println!("  Store size: {} bytes", stats.documents_size_bytes);
            if let Some(modified) = stats.last_modified {
                println!("  Updated:    {}", modified.to_rfc3339());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn trigram_config(temp: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.workspace = temp.path().to_path_buf();
        config.knowledge.embedding.provider = "trigram".to_string();
        config.knowledge.embedding.model = "trigram-v1".to_string();
        config.knowledge.embedding.dimensions = 64;
        config
    }

    #[tokio::test]
    async fn test_add_from_file_records_source() {
        let temp = TempDir::new().unwrap();
        let config = trigram_config(&temp);
        let source = temp.path().join("notes.md");
        std::fs::write(&source, "binary search halves the range").unwrap();

        let add = KnowledgeCommand {
            action: KnowledgeAction::Add(KnowledgeAddCommand {
                text: None,
                file: Some(source.clone()),
                meta: vec![("lang".to_string(), "en".to_string())],
            }),
        };
        add.execute(&config).await.unwrap();

        let kb = KnowledgeBase::open_from_app_config(&config).unwrap();
        let hits = kb.search("binary search", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        let metadata = &hits[0].document.metadata;
        assert_eq!(metadata["lang"], "en");
        assert_eq!(metadata["source"], source.display().to_string());
    }

    #[tokio::test]
    async fn test_add_requires_content() {
        let temp = TempDir::new().unwrap();
        let add = KnowledgeCommand {
            action: KnowledgeAction::Add(KnowledgeAddCommand {
                text: None,
                file: None,
                meta: Vec::new(),
            }),
        };
        assert!(add.execute(&trigram_config(&temp)).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let temp = TempDir::new().unwrap();
        let config = trigram_config(&temp);
        {
            let kb = KnowledgeBase::open_from_app_config(&config).unwrap();
            kb.add("fn main() {}", None).await.unwrap();
        }

        let clear = KnowledgeCommand {
            action: KnowledgeAction::Clear(KnowledgeClearCommand {}),
        };
        clear.execute(&config).await.unwrap();

        let kb = KnowledgeBase::open_from_app_config(&config).unwrap();
        assert!(kb.is_empty().await);
    }

    #[test]
    fn test_parse_meta() {
        assert_eq!(
            parse_meta("source=notes").unwrap(),
            ("source".to_string(), "notes".to_string())
        );
        assert_eq!(parse_meta("url=a=b").unwrap().1, "a=b");
        assert!(parse_meta("novalue").is_err());
        assert!(parse_meta("=x").is_err());
    }
}

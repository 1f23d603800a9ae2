//! Retrieval scenarios against a real on-disk store.

use super::support::{open_fixed, open_trigram, store_config, FixedProvider};
use crate::config::{get_config_path, get_documents_path, get_index_path};
use crate::embeddings::providers::TrigramProvider;
use crate::KnowledgeBase;
use forge_core::AppError;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn code_provider() -> Arc<FixedProvider> {
    Arc::new(FixedProvider::new(&[
        ("def f(): pass", [0.0, 0.0]),
        ("def g(): return 1", [10.0, 0.0]),
        ("def h(): return 2", [4.0, 0.0]),
        ("function returning one", [9.0, 0.0]),
        ("function that passes", [1.0, 0.0]),
    ]))
}

#[tokio::test]
async fn test_query_returns_closest_document() {
    let temp = TempDir::new().unwrap();
    let kb = open_fixed(temp.path(), code_provider());

    assert_eq!(kb.add("def f(): pass", None).await.unwrap(), 0);
    assert_eq!(kb.add("def g(): return 1", None).await.unwrap(), 1);

    let context = kb.query("function returning one", 1).await.unwrap();
    assert_eq!(context, "Document 1:\ndef g(): return 1");
}

#[tokio::test]
async fn test_k_is_clamped_and_ordered() {
    let temp = TempDir::new().unwrap();
    let kb = open_fixed(temp.path(), code_provider());

    kb.add("def f(): pass", None).await.unwrap();
    kb.add("def g(): return 1", None).await.unwrap();
    kb.add("def h(): return 2", None).await.unwrap();

    let hits = kb.search("function that passes", 10).await.unwrap();
    let ids: Vec<u64> = hits.iter().map(|h| h.document.id).collect();
    assert_eq!(ids, vec![0, 2, 1]);

    let context = kb.query("function that passes", 10).await.unwrap();
    assert_eq!(
        context,
        "Document 1:\ndef f(): pass\n\nDocument 2:\ndef h(): return 2\n\nDocument 3:\ndef g(): return 1"
    );
}

#[tokio::test]
async fn test_empty_store_skips_embedding() {
    let temp = TempDir::new().unwrap();
    let provider = code_provider();
    let kb = open_fixed(temp.path(), provider.clone());

    assert_eq!(kb.query("anything", 5).await.unwrap(), "");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let kb = open_fixed(temp.path(), code_provider());

    kb.add("def f(): pass", None).await.unwrap();
    kb.clear().await.unwrap();
    assert!(kb.is_empty().await);
    assert_eq!(kb.query("def f(): pass", 5).await.unwrap(), "");

    kb.clear().await.unwrap();
    assert!(kb.is_empty().await);
    drop(kb);

    let reopened = open_fixed(temp.path(), code_provider());
    assert!(reopened.is_empty().await);
    assert_eq!(reopened.add("def g(): return 1", None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reopen_gives_same_results() {
    let temp = TempDir::new().unwrap();
    let texts = [
        "read a csv file with pandas",
        "open a tcp socket in rust",
        "parse json in javascript",
    ];

    let before = {
        let kb = open_trigram(temp.path(), 128);
        for (i, text) in texts.iter().enumerate() {
            kb.add(text, Some(json!({"n": i, "tags": ["x"]}))).await.unwrap();
        }
        kb.query("csv parsing", 2).await.unwrap()
    };

    let kb = open_trigram(temp.path(), 128);
    assert_eq!(kb.len().await, 3);
    assert_eq!(kb.query("csv parsing", 2).await.unwrap(), before);

    let hits = kb.search("tcp socket", 3).await.unwrap();
    let socket = hits.iter().find(|h| h.document.id == 1).unwrap();
    assert_eq!(socket.document.metadata, json!({"n": 1, "tags": ["x"]}));
}

#[tokio::test]
async fn test_metadata_defaults_to_object() {
    let temp = TempDir::new().unwrap();
    let kb = open_fixed(temp.path(), code_provider());
    kb.add("def f(): pass", None).await.unwrap();

    let hits = kb.search("def f(): pass", 1).await.unwrap();
    assert_eq!(hits[0].document.metadata, json!({}));
    assert_eq!(hits[0].distance, 0.0);
}

#[tokio::test]
async fn test_empty_content_rejected() {
    let temp = TempDir::new().unwrap();
    let provider = code_provider();
    let kb = open_fixed(temp.path(), provider.clone());

    assert!(matches!(kb.add("", None).await, Err(AppError::Knowledge(_))));
    assert!(matches!(kb.add("  \n\t", None).await, Err(AppError::Knowledge(_))));
    assert_eq!(provider.calls(), 0);
    assert!(kb.is_empty().await);
}

#[tokio::test]
async fn test_failed_persist_rolls_back() {
    let temp = TempDir::new().unwrap();
    let kb = open_fixed(temp.path(), code_provider());
    kb.add("def f(): pass", None).await.unwrap();

    // A directory in the temp file's place makes the index write fail.
    let blocker = temp.path().join("index.vec.tmp");
    std::fs::create_dir(&blocker).unwrap();

    let result = kb.add("def g(): return 1", None).await;
    assert!(result.is_err());
    assert_eq!(kb.len().await, 1);

    std::fs::remove_dir(&blocker).unwrap();
    assert_eq!(kb.add("def g(): return 1", None).await.unwrap(), 1);
    drop(kb);

    let reopened = open_fixed(temp.path(), code_provider());
    assert_eq!(reopened.len().await, 2);
}

#[tokio::test]
async fn test_failed_clear_keeps_store_openable() {
    let temp = TempDir::new().unwrap();
    let kb = open_fixed(temp.path(), code_provider());
    kb.add("def f(): pass", None).await.unwrap();

    // An open read transaction elsewhere keeps the delete from committing.
    let reader = rusqlite::Connection::open(get_documents_path(temp.path())).unwrap();
    reader.execute_batch("BEGIN").unwrap();
    let count: i64 = reader
        .query_row("SELECT count(*) FROM documents", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    assert!(kb.clear().await.is_err());
    assert_eq!(kb.len().await, 1);

    reader.execute_batch("COMMIT").unwrap();
    drop(reader);
    drop(kb);

    let reopened = open_fixed(temp.path(), code_provider());
    assert_eq!(reopened.len().await, 1);
    let hits = reopened.search("def f(): pass", 1).await.unwrap();
    assert_eq!(hits[0].document.content, "def f(): pass");
}

#[tokio::test]
async fn test_rejected_open_records_nothing() {
    let temp = TempDir::new().unwrap();
    crate::FlatL2Index::new(2).save(&get_index_path(temp.path())).unwrap();

    let result = KnowledgeBase::open(&store_config(temp.path()), code_provider());
    assert!(matches!(result, Err(AppError::CorruptIndex(_))));
    assert!(!get_config_path(temp.path()).exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_store_creation_leaves_no_index() {
    let temp = TempDir::new().unwrap();
    // Dangling link into a missing directory: absent on disk, but not creatable.
    std::os::unix::fs::symlink(
        temp.path().join("missing").join("documents.sqlite"),
        get_documents_path(temp.path()),
    )
    .unwrap();

    let result = KnowledgeBase::open(&store_config(temp.path()), code_provider());
    assert!(result.is_err());
    assert!(!get_index_path(temp.path()).exists());
    assert!(!get_config_path(temp.path()).exists());
}

#[tokio::test]
async fn test_half_missing_state_is_corrupt() {
    let temp = TempDir::new().unwrap();
    drop(open_fixed(temp.path(), code_provider()));

    std::fs::remove_file(get_documents_path(temp.path())).unwrap();
    let result = KnowledgeBase::open(&store_config(temp.path()), code_provider());
    assert!(matches!(result, Err(AppError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_count_mismatch_is_corrupt() {
    let temp = TempDir::new().unwrap();
    {
        let kb = open_fixed(temp.path(), code_provider());
        kb.add("def f(): pass", None).await.unwrap();
    }

    crate::FlatL2Index::new(2).save(&get_index_path(temp.path())).unwrap();
    let result = KnowledgeBase::open(&store_config(temp.path()), code_provider());
    assert!(matches!(result, Err(AppError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_dimension_mismatch_is_corrupt() {
    let temp = TempDir::new().unwrap();
    drop(open_fixed(temp.path(), code_provider()));

    crate::FlatL2Index::new(3).save(&get_index_path(temp.path())).unwrap();
    let result = KnowledgeBase::open(&store_config(temp.path()), code_provider());
    assert!(matches!(result, Err(AppError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_embedding_config_mismatch() {
    let temp = TempDir::new().unwrap();
    drop(open_trigram(temp.path(), 64));

    let result = KnowledgeBase::open(
        &store_config(temp.path()),
        Arc::new(TrigramProvider::new(128)),
    );
    match result {
        Err(AppError::Knowledge(msg)) => assert!(msg.contains("Dimension mismatch")),
        other => panic!("expected knowledge error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_stats() {
    let temp = TempDir::new().unwrap();
    let kb = open_trigram(temp.path(), 32);
    kb.add("hello world", None).await.unwrap();

    let stats = kb.stats().await.unwrap();
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.dimension, 32);
    assert_eq!(stats.provider, "trigram");
    assert_eq!(stats.model, "trigram-v1");
    assert_eq!(stats.index_size_bytes, 20 + 32 * 4);
    assert!(stats.documents_size_bytes > 0);
    assert!(stats.last_modified.is_some());
}

#[tokio::test]
async fn test_concurrent_adds_get_distinct_ids() {
    let temp = TempDir::new().unwrap();
    let kb = Arc::new(open_trigram(temp.path(), 32));

    let mut handles = Vec::new();
    for i in 0..8 {
        let kb = kb.clone();
        handles.push(tokio::spawn(async move {
            kb.add(&format!("document number {}", i), None).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    assert_eq!(ids, (0..8).collect::<Vec<u64>>());
}

//! SQLite-backed document store.
//!
//! Documents live in one table and are mirrored in memory in id order, so
//! position `i` of the store always holds the document with id `i`.

use crate::types::Document;
use forge_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// Documents of one knowledge store.
pub struct DocumentStore {
    conn: Connection,
    docs: Vec<Document>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.docs.len())
            .finish()
    }
}

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> AppError + '_ {
    move |e| AppError::Knowledge(format!("{}: {}", context, e))
}

impl DocumentStore {
    /// Open (or create) the database and load every document.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            crate::config::ensure_store_dir(parent)?;
        }

        let conn = Connection::open(db_path).map_err(db_err("Failed to open document store"))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL
            );
            "#,
        )
        .map_err(db_err("Failed to create documents table"))?;

        let docs = load_documents(&conn)?;
        tracing::debug!("Opened document store at {:?} ({} documents)", db_path, docs.len());

        Ok(Self { conn, docs })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.docs.get(position)
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Insert `document` and commit only if `before_commit` succeeds.
    ///
    /// On any error the row is rolled back and memory is unchanged.
    pub fn append<F>(&mut self, document: Document, before_commit: F) -> AppResult<()>
    where
        F: FnOnce() -> AppResult<()>,
    {
        let metadata_json = serde_json::to_string(&document.metadata)?;

        let tx = self
            .conn
            .transaction()
            .map_err(db_err("Failed to begin transaction"))?;

        tx.execute(
            "INSERT INTO documents (id, content, metadata) VALUES (?1, ?2, ?3)",
            params![document.id as i64, document.content, metadata_json],
        )
        .map_err(db_err("Failed to insert document"))?;

        before_commit()?;

        tx.commit().map_err(db_err("Failed to commit document"))?;
        self.docs.push(document);
        Ok(())
    }

    /// Delete every document, committing only if `before_commit` succeeds.
    pub fn clear<F>(&mut self, before_commit: F) -> AppResult<()>
    where
        F: FnOnce() -> AppResult<()>,
    {
        let tx = self
            .conn
            .transaction()
            .map_err(db_err("Failed to begin transaction"))?;

        tx.execute("DELETE FROM documents", [])
            .map_err(db_err("Failed to delete documents"))?;

        before_commit()?;

        tx.commit().map_err(db_err("Failed to commit clear"))?;
        self.docs.clear();
        Ok(())
    }
}

fn load_documents(conn: &Connection) -> AppResult<Vec<Document>> {
    let mut stmt = conn
        .prepare("SELECT id, content, metadata FROM documents ORDER BY id")
        .map_err(db_err("Failed to prepare query"))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(db_err("Failed to query documents"))?;

    let mut docs = Vec::new();
    for row in rows {
        let (id, content, metadata_json) = row.map_err(db_err("Failed to read document"))?;
        let metadata: serde_json::Value = serde_json::from_str(&metadata_json).map_err(|e| {
            AppError::CorruptIndex(format!("document {} has invalid metadata: {}", id, e))
        })?;
        docs.push(Document {
            id: id as u64,
            content,
            metadata,
        });
    }

    Ok(docs)
}

//! On-disk layout of a knowledge store.

use forge_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Binary flat vector index.
pub const INDEX_FILE: &str = "index.vec";

/// SQLite document table.
pub const DOCUMENTS_FILE: &str = "documents.sqlite";

/// Embedding settings the store was built with.
pub const CONFIG_FILE: &str = "config.yaml";

/// Get the path to the store's vector index.
pub fn get_index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Get the path to the store's document database.
pub fn get_documents_path(dir: &Path) -> PathBuf {
    dir.join(DOCUMENTS_FILE)
}

/// Get the path to the store's config file.
pub fn get_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Create the store directory if needed.
pub fn ensure_store_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::Knowledge(format!(
            "Failed to create knowledge directory {:?}: {}",
            dir, e
        ))
    })
}

/// Size of a file in bytes, zero when missing.
pub(crate) fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

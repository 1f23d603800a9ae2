//! Construction of the shared services a command needs.

use forge_agents::AgentRegistry;
use forge_core::{config::AppConfig, AppError, AppResult};
use forge_knowledge::KnowledgeBase;
use forge_llm::create_client_from_config;
use std::path::Path;
use std::sync::Arc;

/// Open the retrieval store, or `None` when its embedding provider is not
/// configured (for example, no API key).
pub fn open_knowledge(config: &AppConfig) -> AppResult<Option<Arc<KnowledgeBase>>> {
    match KnowledgeBase::open_from_app_config(config) {
        Ok(kb) => Ok(Some(Arc::new(kb))),
        Err(AppError::Config(msg)) => {
            tracing::warn!("Retrieval disabled: {}", msg);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Build the agents around the configured completion provider.
pub fn build_registry(
    config: &AppConfig,
    knowledge: Option<Arc<KnowledgeBase>>,
) -> AppResult<AgentRegistry> {
    config.validate()?;
    let llm = create_client_from_config(config)?;
    tracing::debug!("Using completion provider {}", llm.provider_name());
    AgentRegistry::from_config(config, Some(llm), knowledge)
}

/// Guess a language name from a file extension.
pub fn infer_language(path: &Path) -> Option<&'static str> {
    let language = match path.extension()?.to_str()?.to_lowercase().as_str() {
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" => "typescript",
        "java" => "java",
        "rs" => "rust",
        "go" => "go",
        "rb" => "ruby",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "cs" => "csharp",
        "kt" => "kotlin",
        "swift" => "swift",
        "php" => "php",
        "sh" => "bash",
        _ => return None,
    };
    Some(language)
}

/// Read a source file and settle its language.
pub fn read_source(path: &Path, language: Option<&str>) -> AppResult<(String, String)> {
    let code = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let language = language
        .or_else(|| infer_language(path))
        .unwrap_or("python")
        .to_string();
    Ok((code, language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_infer_language() {
        assert_eq!(infer_language(Path::new("src/main.rs")), Some("rust"));
        assert_eq!(infer_language(Path::new("app.PY")), Some("python"));
        assert_eq!(infer_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_read_source_language_precedence() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Main.java");
        std::fs::write(&path, "class Main {}").unwrap();

        let (code, language) = read_source(&path, None).unwrap();
        assert_eq!(code, "class Main {}");
        assert_eq!(language, "java");

        let (_, language) = read_source(&path, Some("kotlin")).unwrap();
        assert_eq!(language, "kotlin");

        assert!(read_source(&temp.path().join("missing.py"), None).is_err());
    }
}

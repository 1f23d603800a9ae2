//! Documentation agent.

use crate::executor::PromptExecutor;
use forge_core::AppResult;
use forge_prompt::{PromptCatalog, PromptDefinition, DOCUMENTATION_PROMPT};
use std::collections::HashMap;

pub const DEFAULT_DOC_STYLE: &str = "standard";

/// Convention name for a style keyword in a given language.
///
/// Styles are `standard`, `docstring` and `javadoc`. Languages without a
/// mapping get `"standard style"`.
pub fn resolve_doc_style(language: &str, style: &str) -> &'static str {
    let resolved = match (language.to_lowercase().as_str(), style.to_lowercase().as_str()) {
        ("python", "standard") => Some("Google docstring style"),
        ("python", "docstring") => Some("NumPy/SciPy docstring style"),
        ("python", "javadoc") => Some("reStructuredText (Sphinx) style"),
        ("javascript", "standard") | ("javascript", "javadoc") => Some("JSDoc style"),
        ("javascript", "docstring") => Some("YUIDoc style"),
        ("java", "standard") | ("java", "docstring") | ("java", "javadoc") => {
            Some("Javadoc style")
        }
        _ => None,
    };
    resolved.unwrap_or("standard style")
}

/// Adds documentation to code in a language-specific convention.
#[derive(Debug, Clone)]
pub struct DocumentationAgent {
    executor: PromptExecutor,
    definition: PromptDefinition,
}

impl DocumentationAgent {
    pub fn new(executor: PromptExecutor, catalog: &PromptCatalog) -> AppResult<Self> {
        Ok(Self {
            executor,
            definition: catalog.get(DOCUMENTATION_PROMPT)?.clone(),
        })
    }

    pub async fn document_code(&self, code: &str, language: &str, style: &str) -> AppResult<String> {
        let doc_style = resolve_doc_style(language, style);
        tracing::info!("Documenting {} code in {}", language, doc_style);

        let mut variables = HashMap::new();
        variables.insert("language".to_string(), language.to_string());
        variables.insert("code".to_string(), code.to_string());
        variables.insert("docStyle".to_string(), doc_style.to_string());

        let documented = self.executor.run(&self.definition, variables).await?;
        tracing::debug!("Documented code ({} bytes)", documented.len());
        Ok(documented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubLlm;

    #[test]
    fn test_style_mapping() {
        assert_eq!(resolve_doc_style("python", "standard"), "Google docstring style");
        assert_eq!(resolve_doc_style("Python", "DOCSTRING"), "NumPy/SciPy docstring style");
        assert_eq!(resolve_doc_style("python", "javadoc"), "reStructuredText (Sphinx) style");
        assert_eq!(resolve_doc_style("javascript", "docstring"), "YUIDoc style");
        assert_eq!(resolve_doc_style("javascript", "javadoc"), "JSDoc style");
        assert_eq!(resolve_doc_style("java", "docstring"), "Javadoc style");
        assert_eq!(resolve_doc_style("rust", "standard"), "standard style");
        assert_eq!(resolve_doc_style("python", "sphinx"), "standard style");
    }

    #[tokio::test]
    async fn test_document_code() {
        let llm = StubLlm::replying("```java\n/** Adds. */\nint add(int a, int b) { return a + b; }\n```");
        let agent = DocumentationAgent::new(
            PromptExecutor::new(llm.clone(), None, "gpt-4o"),
            &PromptCatalog::builtin().unwrap(),
        )
        .unwrap();

        let documented = agent
            .document_code("int add(int a, int b) { return a + b; }", "java", "standard")
            .await
            .unwrap();

        assert_eq!(documented, "/** Adds. */\nint add(int a, int b) { return a + b; }");
        let user = llm.user_message(0);
        assert!(user.contains("document the following java code using Javadoc style"));
        assert!(user.contains("4. Follow Javadoc style conventions consistently"));
    }
}

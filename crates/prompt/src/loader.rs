//! Prompt loader for built-in and workspace YAML prompt definitions.
//!
//! Built-in prompts are compiled into the binary. A file
//! `.forge/prompts/<id>.yml` in the workspace replaces the built-in with the
//! same id, or adds a new prompt.

use crate::types::PromptDefinition;
use forge_core::{AppError, AppResult};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Prompt ids used by the agents.
pub const REQUIREMENTS_PROMPT: &str = "agent.requirements";
pub const CODING_PROMPT: &str = "agent.coding";
pub const DEBUGGING_PROMPT: &str = "agent.debugging";
pub const OPTIMIZATION_PROMPT: &str = "agent.optimization";
pub const DOCUMENTATION_PROMPT: &str = "agent.documentation";

const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (
        REQUIREMENTS_PROMPT,
        include_str!("../prompts/agent.requirements.yml"),
    ),
    (CODING_PROMPT, include_str!("../prompts/agent.coding.yml")),
    (DEBUGGING_PROMPT, include_str!("../prompts/agent.debugging.yml")),
    (
        OPTIMIZATION_PROMPT,
        include_str!("../prompts/agent.optimization.yml"),
    ),
    (
        DOCUMENTATION_PROMPT,
        include_str!("../prompts/agent.documentation.yml"),
    ),
];

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".forge/prompts")
}

/// Load a prompt definition by ID.
///
/// The workspace file `.forge/prompts/<id>.yml` wins over a built-in prompt.
///
/// # Example
/// ```no_run
/// use forge_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "agent.coding")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;
        if definition.id != prompt_id {
            return Err(AppError::Prompt(format!(
                "Prompt file {:?} declares id '{}', expected '{}'",
                prompt_file, definition.id, prompt_id
            )));
        }
        return Ok(definition);
    }

    match BUILTIN_PROMPTS.iter().find(|(id, _)| *id == prompt_id) {
        Some((id, contents)) => parse_prompt(contents, &format!("built-in {}", id)),
        None => Err(AppError::Prompt(format!("Prompt not found: {}", prompt_id))),
    }
}

/// List all available prompt IDs: built-ins plus workspace files, sorted.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: BTreeSet<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.insert(stem.to_string());
                }
            }
        }
    }

    Ok(prompt_ids.into_iter().collect())
}

/// The five agent prompts, resolved once at startup.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    prompts: HashMap<String, PromptDefinition>,
}

impl PromptCatalog {
    /// Load every agent prompt, applying workspace overrides.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        let mut prompts = HashMap::new();
        for (id, _) in BUILTIN_PROMPTS {
            prompts.insert(id.to_string(), load_prompt(workspace_path, id)?);
        }
        tracing::debug!("Loaded {} prompts", prompts.len());
        Ok(Self { prompts })
    }

    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        let mut prompts = HashMap::new();
        for (id, contents) in BUILTIN_PROMPTS {
            prompts.insert(id.to_string(), parse_prompt(contents, id)?);
        }
        Ok(Self { prompts })
    }

    pub fn get(&self, prompt_id: &str) -> AppResult<&PromptDefinition> {
        self.prompts
            .get(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))
    }

    /// Replace or add a definition.
    pub fn insert(&mut self, definition: PromptDefinition) {
        self.prompts.insert(definition.id.clone(), definition);
    }
}

fn parse_prompt(contents: &str, source: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", source, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.retrieval.enabled && def.retrieval.query.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt {} enables retrieval without a query",
            def.id
        )));
    }

    if !(0.0..=2.0).contains(&def.sampling.temperature) {
        return Err(AppError::Prompt(format!(
            "Prompt {} temperature {} is outside 0.0-2.0",
            def.id, def.sampling.temperature
        )));
    }

    Ok(())
}

//! Embedding configuration recorded alongside each store.

use forge_core::config::EmbeddingSettings;
use forge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Embedding settings a store was built with.
///
/// Vectors from different models are not comparable, so a store refuses to
/// open with settings that differ from the recorded ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "openai", "ollama", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from(&EmbeddingSettings::default())
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        }
    }
}

impl EmbeddingConfig {
    /// Load the recorded config of a store, if any.
    pub fn load(dir: &Path) -> AppResult<Option<Self>> {
        let config_path = crate::config::get_config_path(dir);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Knowledge(format!(
                "Failed to parse config at {:?}: {}",
                config_path, e
            ))
        })?;

        Ok(Some(config))
    }

    /// Record this config in the store directory.
    pub fn save(&self, dir: &Path) -> AppResult<()> {
        crate::config::ensure_store_dir(dir)?;
        let config_path = crate::config::get_config_path(dir);

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| AppError::Knowledge(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, yaml).map_err(|e| {
            AppError::Knowledge(format!(
                "Failed to write config to {:?}: {}",
                config_path, e
            ))
        })?;

        tracing::debug!("Saved embedding config to {:?}", config_path);
        Ok(())
    }

    /// Validate that another config is consistent with this one.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::Knowledge(format!(
                "Provider mismatch: store was built with '{}', got '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::Knowledge(format!(
                "Model mismatch: store was built with '{}', got '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::Knowledge(format!(
                "Dimension mismatch: store was built with {}, got {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}

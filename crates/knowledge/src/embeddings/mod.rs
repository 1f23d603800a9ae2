//! Embedding providers for knowledge stores.
//!
//! Provides provider-agnostic embedding generation. A store records the
//! provider, model and dimension it was built with in its `config.yaml`.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};

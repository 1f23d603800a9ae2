//! Forge Core Library
//!
//! This crate provides the foundational utilities shared by every Forge crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Retry with backoff for remote calls

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use retry::{retry_async, RetryPolicy};

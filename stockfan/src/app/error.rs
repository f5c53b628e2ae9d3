//! Application error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lookup::LookupError;
use crate::registry::RegistryError;
use crate::source::SourceError;

/// Errors that can occur during the application lifecycle.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build source registry: {0}")]
    Registry(#[from] RegistryError),

    /// Adapter construction failed (e.g. HTTP client setup).
    #[error("Failed to create source adapters: {0}")]
    Adapter(#[from] SourceError),

    #[error("Failed to create Tokio runtime: {0}")]
    RuntimeCreation(String),

    /// A blocking call was made on an app started with `start()`.
    #[error("Application has no owned runtime; use start_sync() for blocking calls")]
    NoRuntime,

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

//! CLI error type.

use thiserror::Error;

use stockfan::config::ConfigError;
use stockfan::logging::LoggingError;
use stockfan::{AppError, LookupError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to start: {0}")]
    App(AppError),

    #[error("{0}")]
    Lookup(#[from] LookupError),

    #[error("Server error: {0}")]
    Serve(String),

    #[error("Failed to write output: {0}")]
    Output(String),
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Lookup(lookup) => CliError::Lookup(lookup),
            other => CliError::App(other),
        }
    }
}

impl CliError {
    /// Process exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Lookup(LookupError::Validation(_)) => 2,
            _ => 1,
        }
    }
}

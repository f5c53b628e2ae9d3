//! Shared setup for commands that run the lookup service.

use std::path::{Path, PathBuf};

use stockfan::config::ConfigFile;
use stockfan::logging::{init_logging, LoggingConfig, LoggingGuard};
use stockfan::{AppConfig, MatchMode, StockApp};
use tracing::info;

use crate::error::CliError;

/// Loaded config plus installed logging.
pub struct CliRunner {
    config_path: PathBuf,
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load the config file and install logging.
    ///
    /// `log_level` overrides the configured level (from `-v`/`-q`).
    pub fn new(config_path: &Path, log_level: Option<&str>) -> Result<Self, CliError> {
        let config = ConfigFile::load_from(config_path)?;

        let mut logging = LoggingConfig::from(&config.logging);
        if let Some(level) = log_level {
            logging = logging.with_level(level);
        }
        let guard = init_logging(&logging)?;

        Ok(Self {
            config_path: config_path.to_path_buf(),
            config,
            _logging: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = stockfan::VERSION,
            command,
            config = %self.config_path.display(),
            sources = self.config.sources.len(),
            "stockfan starting"
        );
    }

    /// Start the service on its own runtime.
    pub fn start_app(&self, match_mode: Option<MatchMode>) -> Result<StockApp, CliError> {
        if self.config.sources.is_empty() {
            return Err(CliError::Config(format!(
                "No sources configured in {}. Add one with 'stockfan sources add <ID> <LOCATION>'.",
                self.config_path.display()
            )));
        }

        let mut app_config = AppConfig::from_config_file(&self.config);
        if let Some(mode) = match_mode {
            app_config = app_config.with_match_mode(mode);
        }

        Ok(StockApp::start_sync(app_config)?)
    }
}

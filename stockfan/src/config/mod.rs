//! User configuration.
//!
//! - [`ConfigFile`]: the INI file at [`config_file_path`]
//! - [`ConfigKey`]: `section.key` access used by the CLI

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, CacheSettings, ConfigError, ConfigFile, LoggingSettings,
    LookupSettings, ServerSettings, CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL,
    DEFAULT_SOURCE_TIMEOUT_SECS, DEFAULT_TTL_SECS,
};
pub use keys::ConfigKey;

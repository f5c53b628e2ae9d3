//! INI configuration file.
//!
//! Lives at `~/.stockfan/config.ini`. A missing file means defaults; a
//! present file only needs the keys it wants to override.
//!
//! ```ini
//! [cache]
//! ttl_secs = 600
//! max_entries = 0
//!
//! [lookup]
//! workers = 0
//! source_timeout_secs = 30
//! match = contains
//!
//! [server]
//! bind = 127.0.0.1:5000
//!
//! [logging]
//! level = info
//! file =
//!
//! [sources]
//! Komerco = snapshot:/srv/stock/kom.json
//! Warehouse = https://inventory.example.com/api
//! Puebla = snapshot:S:\Datos\PUE2025.json
//! ```
//!
//! Backslashes are taken literally, there are no escape sequences.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::{EscapePolicy, Ini, ParseOption, WriteOption};
use thiserror::Error;

use crate::query::MatchMode;
use crate::source::{SourceDescriptor, SourceLocation};

/// Directory name under the user's home.
pub const CONFIG_DIR_NAME: &str = ".stockfan";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

pub const DEFAULT_TTL_SECS: u64 = 600;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors reading, validating or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid source '{id}': {reason}")]
    InvalidSource { id: String, reason: String },

    #[error("Source '{0}' is already configured")]
    DuplicateSource(String),

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    /// `0` means bounded by TTL only.
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: 0,
        }
    }
}

/// `[lookup]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    /// `0` means one worker per registered source.
    pub workers: usize,
    pub source_timeout_secs: u64,
    pub match_mode: MatchMode,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            workers: 0,
            source_timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
            match_mode: MatchMode::default(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Level or `EnvFilter` directive string.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// The whole config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub lookup: LookupSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    /// `[sources]` in file order.
    pub sources: Vec<SourceDescriptor>,
}

/// `~/.stockfan`, or `./.stockfan` when no home directory is known.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default path of the config file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

impl ConfigFile {
    /// Load from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, returning defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file_opt(path, parse_option())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Parse from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str_opt(text, parse_option())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cache = CacheSettings {
            ttl_secs: read_value(ini, "cache", "ttl_secs", defaults.cache.ttl_secs)?,
            max_entries: read_value(ini, "cache", "max_entries", defaults.cache.max_entries)?,
        };

        let lookup = LookupSettings {
            workers: read_value(ini, "lookup", "workers", defaults.lookup.workers)?,
            source_timeout_secs: read_value(
                ini,
                "lookup",
                "source_timeout_secs",
                defaults.lookup.source_timeout_secs,
            )?,
            match_mode: read_value(ini, "lookup", "match", defaults.lookup.match_mode)?,
        };
        if lookup.source_timeout_secs == 0 {
            return Err(invalid("lookup", "source_timeout_secs", "0", "must be positive"));
        }

        let server = ServerSettings {
            bind: read_value(ini, "server", "bind", defaults.server.bind)?,
        };

        let level = read_raw(ini, "logging", "level")
            .map(str::to_string)
            .unwrap_or(defaults.logging.level);
        validate_log_level(&level)?;
        let logging = LoggingSettings {
            level,
            file: read_raw(ini, "logging", "file").map(PathBuf::from),
        };

        let mut sources: Vec<SourceDescriptor> = Vec::new();
        if let Some(section) = ini.section(Some("sources")) {
            for (id, value) in section.iter() {
                let descriptor = parse_source(id, value)?;
                if sources.iter().any(|s| s.id == descriptor.id) {
                    return Err(ConfigError::DuplicateSource(descriptor.id));
                }
                sources.push(descriptor);
            }
        }

        Ok(Self {
            cache,
            lookup,
            server,
            logging,
            sources,
        })
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file_opt(path, write_option())?;
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("cache"))
            .set("ttl_secs", self.cache.ttl_secs.to_string())
            .set("max_entries", self.cache.max_entries.to_string());

        ini.with_section(Some("lookup"))
            .set("workers", self.lookup.workers.to_string())
            .set(
                "source_timeout_secs",
                self.lookup.source_timeout_secs.to_string(),
            )
            .set("match", self.lookup.match_mode.as_str());

        ini.with_section(Some("server"))
            .set("bind", self.server.bind.to_string());

        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set(
                "file",
                self.logging
                    .file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            );

        for source in &self.sources {
            ini.set_to(
                Some("sources"),
                source.id.clone(),
                source.location.to_string(),
            );
        }

        ini
    }

    /// Append a source.
    pub fn add_source(&mut self, id: &str, location: &str) -> Result<(), ConfigError> {
        let descriptor = parse_source(id, location)?;
        if self.sources.iter().any(|s| s.id == descriptor.id) {
            return Err(ConfigError::DuplicateSource(descriptor.id));
        }
        self.sources.push(descriptor);
        Ok(())
    }

    /// Remove a source by id. Returns whether it was present.
    pub fn remove_source(&mut self, id: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|s| s.id != id.trim());
        self.sources.len() != before
    }
}

/// Backslashes are literal so Windows paths can be written by hand.
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

fn write_option() -> WriteOption {
    WriteOption {
        escape_policy: EscapePolicy::Nothing,
        ..Default::default()
    }
}

fn parse_source(id: &str, value: &str) -> Result<SourceDescriptor, ConfigError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ConfigError::InvalidSource {
            id: id.to_string(),
            reason: "source id must not be empty".to_string(),
        });
    }
    let location = SourceLocation::from_str(value).map_err(|reason| ConfigError::InvalidSource {
        id: id.to_string(),
        reason,
    })?;
    Ok(SourceDescriptor::new(id, location))
}

/// Check a log level or filter directive.
pub(crate) fn validate_log_level(level: &str) -> Result<(), ConfigError> {
    tracing_subscriber::EnvFilter::try_new(level)
        .map(|_| ())
        .map_err(|e| invalid("logging", "level", level, &e.to_string()))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Non-empty trimmed value of `section.key`.
fn read_raw<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|props| props.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn read_value<T>(ini: &Ini, section: &str, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match read_raw(ini, section, key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| invalid(section, key, raw, &e.to_string())),
        None => Ok(default),
    }
}

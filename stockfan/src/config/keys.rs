//! Typed access to scalar settings by `section.key` name.
//!
//! Backs the `config get|set|list` CLI commands. Sources are not covered
//! here; they have their own commands.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::file::{validate_log_level, ConfigError, ConfigFile};
use crate::query::MatchMode;

/// A settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    CacheTtlSecs,
    CacheMaxEntries,
    LookupWorkers,
    LookupSourceTimeoutSecs,
    LookupMatch,
    ServerBind,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 8] = [
    ConfigKey::CacheTtlSecs,
    ConfigKey::CacheMaxEntries,
    ConfigKey::LookupWorkers,
    ConfigKey::LookupSourceTimeoutSecs,
    ConfigKey::LookupMatch,
    ConfigKey::ServerBind,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CacheTtlSecs | ConfigKey::CacheMaxEntries => "cache",
            ConfigKey::LookupWorkers
            | ConfigKey::LookupSourceTimeoutSecs
            | ConfigKey::LookupMatch => "lookup",
            ConfigKey::ServerBind => "server",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::CacheTtlSecs => "ttl_secs",
            ConfigKey::CacheMaxEntries => "max_entries",
            ConfigKey::LookupWorkers => "workers",
            ConfigKey::LookupSourceTimeoutSecs => "source_timeout_secs",
            ConfigKey::LookupMatch => "match",
            ConfigKey::ServerBind => "bind",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Current value as written in the file. Empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::CacheTtlSecs => config.cache.ttl_secs.to_string(),
            ConfigKey::CacheMaxEntries => config.cache.max_entries.to_string(),
            ConfigKey::LookupWorkers => config.lookup.workers.to_string(),
            ConfigKey::LookupSourceTimeoutSecs => config.lookup.source_timeout_secs.to_string(),
            ConfigKey::LookupMatch => config.lookup.match_mode.to_string(),
            ConfigKey::ServerBind => config.server.bind.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and apply `value`. The config is untouched on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::CacheTtlSecs => config.cache.ttl_secs = self.parse(value)?,
            ConfigKey::CacheMaxEntries => config.cache.max_entries = self.parse(value)?,
            ConfigKey::LookupWorkers => config.lookup.workers = self.parse(value)?,
            ConfigKey::LookupSourceTimeoutSecs => {
                let secs: u64 = self.parse(value)?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be positive".to_string()));
                }
                config.lookup.source_timeout_secs = secs;
            }
            ConfigKey::LookupMatch => config.lookup.match_mode = self.parse::<MatchMode>(value)?,
            ConfigKey::ServerBind => config.server.bind = self.parse(value)?,
            ConfigKey::LoggingLevel => {
                validate_log_level(value)?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }
        Ok(())
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(value, e.to_string()))
    }

    fn invalid(&self, value: &str, reason: String) -> ConfigError {
        ConfigError::InvalidValue {
            section: self.section().to_string(),
            key: self.key_name().to_string(),
            value: value.to_string(),
            reason,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!(
            "cache.ttl_secs".parse::<ConfigKey>().unwrap(),
            ConfigKey::CacheTtlSecs
        );
        assert_eq!(
            " Lookup.Match ".parse::<ConfigKey>().unwrap(),
            ConfigKey::LookupMatch
        );
        assert!(matches!(
            "cache.size".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
            assert_eq!(key.to_string(), key.name());
        }
    }

    #[test]
    fn test_get_defaults() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::CacheTtlSecs.get(&config), "600");
        assert_eq!(ConfigKey::LookupMatch.get(&config), "contains");
        assert_eq!(ConfigKey::ServerBind.get(&config), "127.0.0.1:5000");
        assert_eq!(ConfigKey::LoggingFile.get(&config), "");
    }

    #[test]
    fn test_set_values() {
        let mut config = ConfigFile::default();

        ConfigKey::CacheTtlSecs.set(&mut config, "30").unwrap();
        ConfigKey::LookupMatch.set(&mut config, "exact").unwrap();
        ConfigKey::ServerBind.set(&mut config, "0.0.0.0:9000").unwrap();
        ConfigKey::LoggingFile.set(&mut config, "/tmp/sf.log").unwrap();

        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.lookup.match_mode, MatchMode::Exact);
        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/sf.log")));

        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ConfigFile::default();

        assert!(ConfigKey::CacheTtlSecs.set(&mut config, "-1").is_err());
        assert!(ConfigKey::LookupMatch.set(&mut config, "fuzzy").is_err());
        assert!(ConfigKey::LookupSourceTimeoutSecs
            .set(&mut config, "0")
            .is_err());
        assert!(ConfigKey::ServerBind.set(&mut config, "localhost").is_err());

        assert_eq!(config, ConfigFile::default());
    }
}

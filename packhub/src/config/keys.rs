//! Settable configuration keys for `config get/set/list`.

use std::path::PathBuf;
use std::str::FromStr;

use super::file::{parse_bool, parse_port, parse_secs, ConfigError, ConfigFile};

/// A `section.key` the CLI can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ServerHost,
    ServerPort,
    StoreSnapshot,
    StoreAutosaveSecs,
    MetricsEnabled,
    MetricsIntervalSecs,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServerHost,
            ConfigKey::ServerPort,
            ConfigKey::StoreSnapshot,
            ConfigKey::StoreAutosaveSecs,
            ConfigKey::MetricsEnabled,
            ConfigKey::MetricsIntervalSecs,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ServerHost | ConfigKey::ServerPort => "server",
            ConfigKey::StoreSnapshot | ConfigKey::StoreAutosaveSecs => "store",
            ConfigKey::MetricsEnabled | ConfigKey::MetricsIntervalSecs => "metrics",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ServerHost => "host",
            ConfigKey::ServerPort => "port",
            ConfigKey::StoreSnapshot => "snapshot",
            ConfigKey::StoreAutosaveSecs => "autosave_secs",
            ConfigKey::MetricsEnabled => "enabled",
            ConfigKey::MetricsIntervalSecs => "interval_secs",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// `section.key`
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        fn path(p: &Option<PathBuf>) -> String {
            p.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
        }

        match self {
            ConfigKey::ServerHost => config.server.host.clone(),
            ConfigKey::ServerPort => config.server.port.to_string(),
            ConfigKey::StoreSnapshot => path(&config.store.snapshot),
            ConfigKey::StoreAutosaveSecs => config.store.autosave_secs.to_string(),
            ConfigKey::MetricsEnabled => config.metrics.enabled.to_string(),
            ConfigKey::MetricsIntervalSecs => config.metrics.interval_secs.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => path(&config.logging.directory),
        }
    }

    /// Parse and store `value`. An empty value clears optional paths.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let name = self.name();
        let optional = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| PathBuf::from(v))
        };

        match self {
            ConfigKey::ServerHost => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: name,
                        value: value.to_string(),
                        reason: "host must not be empty".to_string(),
                    });
                }
                config.server.host = value.trim().to_string();
            }
            ConfigKey::ServerPort => config.server.port = parse_port(&name, value)?,
            ConfigKey::StoreSnapshot => config.store.snapshot = optional(value),
            ConfigKey::StoreAutosaveSecs => config.store.autosave_secs = parse_secs(&name, value)?,
            ConfigKey::MetricsEnabled => config.metrics.enabled = parse_bool(&name, value)?,
            ConfigKey::MetricsIntervalSecs => {
                let secs = parse_secs(&name, value)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: name,
                        value: value.to_string(),
                        reason: "interval must be at least one second".to_string(),
                    });
                }
                config.metrics.interval_secs = secs;
            }
            ConfigKey::LoggingLevel => config.logging.level = value.trim().to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory = optional(value),
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!("server.port".parse::<ConfigKey>().unwrap(), ConfigKey::ServerPort);
        assert_eq!(
            "METRICS.interval_secs".parse::<ConfigKey>().unwrap(),
            ConfigKey::MetricsIntervalSecs
        );
        assert!(matches!(
            "server.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_get_and_set() {
        let mut config = ConfigFile::default();
        ConfigKey::ServerPort.set(&mut config, "8081").unwrap();
        assert_eq!(ConfigKey::ServerPort.get(&config), "8081");

        ConfigKey::StoreSnapshot
            .set(&mut config, "/tmp/catalog.json")
            .unwrap();
        assert_eq!(ConfigKey::StoreSnapshot.get(&config), "/tmp/catalog.json");
        ConfigKey::StoreSnapshot.set(&mut config, "").unwrap();
        assert_eq!(config.store.snapshot, None);

        ConfigKey::MetricsEnabled.set(&mut config, "off").unwrap();
        assert!(!config.metrics.enabled);

        assert!(ConfigKey::ServerPort.set(&mut config, "70000").is_err());
        assert!(ConfigKey::MetricsIntervalSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::ServerHost.set(&mut config, " ").is_err());
    }
}

//! INI configuration file.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::debug;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 9000;

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default seconds between snapshot writes.
pub const DEFAULT_AUTOSAVE_SECS: u64 = 300;

/// Default seconds between metrics passes.
pub const DEFAULT_METRICS_INTERVAL_SECS: u64 = 3600;

/// Environment variable that overrides `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// `[store]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// JSON snapshot file. Without one the catalog lives in memory only.
    pub snapshot: Option<PathBuf>,
    /// Seconds between snapshot writes; 0 disables autosave.
    pub autosave_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            snapshot: None,
            autosave_secs: DEFAULT_AUTOSAVE_SECS,
        }
    }
}

/// `[metrics]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_METRICS_INTERVAL_SECS,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily log files. Console only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Parsed `config.ini`.
///
/// ```ini
/// [server]
/// host = 0.0.0.0
/// port = 9000
///
/// [store]
/// snapshot = /var/lib/packhub/catalog.json
/// autosave_secs = 300
///
/// [metrics]
/// enabled = true
/// interval_secs = 3600
///
/// [logging]
/// level = info
/// directory = /var/log/packhub
///
/// [tokens]
/// some-opaque-token = user-id
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub metrics: MetricsSettings,
    pub logging: LoggingSettings,
    /// Static token table, token to user id.
    pub tokens: BTreeMap<String, String>,
}

/// Path of the user's configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Directory holding `config.ini`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("packhub")
}

/// Suggested snapshot location under the user's data directory.
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("packhub")
        .join("catalog.json")
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

pub(crate) fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    parse_value(key, value)
}

pub(crate) fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    parse_value(key, value)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

impl ConfigFile {
    /// Load from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI data. Missing keys keep their defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("server")) {
            if let Some(host) = section.get("host") {
                config.server.host = host.trim().to_string();
            }
            if let Some(port) = section.get("port") {
                config.server.port = parse_port("server.port", port)?;
            }
        }
        if let Some(section) = ini.section(Some("store")) {
            if let Some(snapshot) = section.get("snapshot") {
                config.store.snapshot = optional_path(snapshot);
            }
            if let Some(secs) = section.get("autosave_secs") {
                config.store.autosave_secs = parse_secs("store.autosave_secs", secs)?;
            }
        }
        if let Some(section) = ini.section(Some("metrics")) {
            if let Some(enabled) = section.get("enabled") {
                config.metrics.enabled = parse_bool("metrics.enabled", enabled)?;
            }
            if let Some(secs) = section.get("interval_secs") {
                config.metrics.interval_secs = parse_secs("metrics.interval_secs", secs)?;
            }
        }
        if let Some(section) = ini.section(Some("logging")) {
            if let Some(level) = section.get("level") {
                config.logging.level = level.trim().to_string();
            }
            if let Some(directory) = section.get("directory") {
                config.logging.directory = optional_path(directory);
            }
        }
        if let Some(section) = ini.section(Some("tokens")) {
            for (token, user) in section.iter() {
                config.tokens.insert(token.to_string(), user.trim().to_string());
            }
        }

        Ok(config)
    }

    /// Render as INI data.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("server"))
            .set("host", self.server.host.as_str())
            .set("port", self.server.port.to_string());
        ini.with_section(Some("store"))
            .set(
                "snapshot",
                self.store
                    .snapshot
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
            .set("autosave_secs", self.store.autosave_secs.to_string());
        ini.with_section(Some("metrics"))
            .set("enabled", self.metrics.enabled.to_string())
            .set("interval_secs", self.metrics.interval_secs.to_string());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set(
                "directory",
                self.logging
                    .directory
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            );
        for (token, user) in &self.tokens {
            ini.with_section(Some("tokens"))
                .set(token.as_str(), user.as_str());
        }
        ini
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating the parent directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Apply a `PORT` override value.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(port) = value.filter(|v| !v.trim().is_empty()) {
            self.server.port = parse_port(PORT_ENV, port)?;
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let port = std::env::var(PORT_ENV).ok();
        self.apply_port_override(port.as_deref())
    }
}

//! User configuration.
//!
//! Settings live in `config.ini` under the platform config directory
//! (`~/.config/packhub/config.ini` on Linux). Missing files and keys fall
//! back to defaults, and the `PORT` environment variable overrides
//! `server.port`.

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, default_snapshot_path, ConfigError, ConfigFile,
    LoggingSettings, MetricsSettings, ServerSettings, StoreSettings, DEFAULT_AUTOSAVE_SECS,
    DEFAULT_HOST, DEFAULT_METRICS_INTERVAL_SECS, DEFAULT_PORT, PORT_ENV,
};
pub use keys::ConfigKey;

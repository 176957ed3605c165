//! Shared setup for long-running commands.

use packhub::config::ConfigFile;
use packhub::logging::{init_logging, WorkerGuard};
use tracing::info;

use crate::error::CliError;

/// Loads configuration and installs logging.
///
/// Keep the runner alive for the duration of the command; dropping it
/// flushes the log file.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load `config.ini`, apply `PORT`, and start logging.
    pub fn new() -> Result<Self, CliError> {
        let mut config = ConfigFile::load()?;
        config.apply_env_overrides()?;

        let log_guard = init_logging(&config.logging.level, config.logging.directory.as_deref())?;

        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log which command is starting.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = packhub::VERSION,
            config = %packhub::config::config_file_path().display(),
            "PackHub CLI starting"
        );
    }

    /// Build a multi-threaded tokio runtime.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}

//! Runtime configuration for `PackHubApp`.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ConfigFile, DEFAULT_HOST, DEFAULT_PORT};
use crate::metrics::MetricsDaemonConfig;
use crate::model::UserId;

/// Everything `PackHubApp::start()` needs.
///
/// Built from a [`ConfigFile`] by the CLI, or directly with the `with_*`
/// setters in tests.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    /// Port to bind; 0 picks a free port.
    pub port: u16,

    /// JSON snapshot loaded on start and written on shutdown.
    pub snapshot: Option<PathBuf>,

    /// Periodic snapshot interval. Ignored without a snapshot path.
    pub autosave: Option<Duration>,

    /// Metrics daemon settings; `None` disables the daemon.
    pub metrics: Option<MetricsDaemonConfig>,

    /// Static token table.
    pub tokens: Vec<(String, UserId)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            snapshot: None,
            autosave: None,
            metrics: Some(MetricsDaemonConfig::default()),
            tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Translate the user's configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let autosave = (config.store.autosave_secs > 0)
            .then(|| Duration::from_secs(config.store.autosave_secs));
        let metrics = config.metrics.enabled.then(|| {
            MetricsDaemonConfig::default()
                .with_interval(Duration::from_secs(config.metrics.interval_secs.max(1)))
        });

        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            snapshot: config.store.snapshot.clone(),
            autosave,
            metrics,
            tokens: config
                .tokens
                .iter()
                .map(|(token, user)| (token.clone(), UserId::new(user.as_str())))
                .collect(),
        }
    }

    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    pub fn with_autosave(mut self, interval: Duration) -> Self {
        self.autosave = Some(interval);
        self
    }

    pub fn with_metrics(mut self, metrics: Option<MetricsDaemonConfig>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<UserId>) -> Self {
        self.tokens.push((token.into(), user.into()));
        self
    }

    /// `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.server.port = 8000;
        file.store.snapshot = Some(PathBuf::from("/tmp/catalog.json"));
        file.store.autosave_secs = 0;
        file.metrics.interval_secs = 60;
        file.tokens.insert("t1".to_string(), "alice".to_string());

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.autosave, None);
        assert_eq!(
            config.metrics.map(|m| m.interval),
            Some(Duration::from_secs(60))
        );
        assert_eq!(config.tokens, vec![("t1".to_string(), UserId::new("alice"))]);
    }

    #[test]
    fn test_metrics_disabled() {
        let mut file = ConfigFile::default();
        file.metrics.enabled = false;
        assert!(AppConfig::from_config_file(&file).metrics.is_none());
    }
}

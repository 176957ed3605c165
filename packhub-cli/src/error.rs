//! CLI error type.

use std::fmt;
use std::process;

use console::style;
use packhub::app::AppError;
use packhub::client::ClientError;
use packhub::config::ConfigError;
use packhub::logging::LoggingError;
use packhub::store::StoreError;

/// Everything a command can fail with.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration.
    Config(String),
    /// Invalid command-line argument.
    InvalidArgument(String),
    Logging(LoggingError),
    App(AppError),
    Store(StoreError),
    Client(ClientError),
    /// Failed to build the async runtime.
    Runtime(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Store(e) => write!(f, "Catalog store error: {}", e),
            CliError::Client(e) => write!(f, "Request failed: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Logging(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Config(_) | CliError::InvalidArgument(_) => None,
        }
    }
}

impl CliError {
    /// Print the error to stderr and exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("{} {}", style("error:").red().bold(), self);
        process::exit(1);
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<ClientError> for CliError {
    fn from(e: ClientError) -> Self {
        CliError::Client(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: CliError = ConfigError::UnknownKey("server.nope".to_string()).into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("server.nope"));
    }
}

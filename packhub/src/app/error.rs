//! Application error types.

use std::fmt;
use std::io;

use crate::store::StoreError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to load or save the catalog snapshot.
    Store(StoreError),

    /// Failed to bind the HTTP listener.
    Bind { address: String, source: io::Error },

    /// The HTTP server stopped with an error.
    Server(io::Error),

    /// A background task panicked or was aborted.
    Task(String),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Catalog store error: {}", e),
            AppError::Bind { address, source } => {
                write!(f, "Failed to bind {}: {}", address, source)
            }
            AppError::Server(e) => write!(f, "HTTP server error: {}", e),
            AppError::Task(msg) => write!(f, "Background task failed: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Store(e) => Some(e),
            AppError::Bind { source, .. } => Some(source),
            AppError::Server(e) => Some(e),
            AppError::Task(_) | AppError::Config(_) => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Bind {
            address: "0.0.0.0:9000".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("Failed to bind 0.0.0.0:9000"));
        assert!(std::error::Error::source(&err).is_some());

        let err = AppError::Config("bad port".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad port");
    }
}

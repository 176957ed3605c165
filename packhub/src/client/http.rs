//! HTTP client abstraction for testability

use std::time::Duration;

use thiserror::Error;

use crate::api::ErrorBody;

/// Errors from the catalog client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or unusable URL.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body was not the expected JSON.
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

/// Trait for HTTP client operations.
///
/// Lets tests swap in a canned client.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the body.
    fn get(&self, url: &str) -> Result<Vec<u8>, ClientError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with a 30 second timeout.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_timeout(30)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("packhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ClientError::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ClientError::Http(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Canned responses keyed by URL. Unknown URLs answer 404.
    #[derive(Default)]
    pub struct MockHttpClient {
        pub responses: HashMap<String, Vec<u8>>,
    }

    impl MockHttpClient {
        pub fn with_json(mut self, url: &str, body: serde_json::Value) -> Self {
            self.responses.insert(url.to_string(), body.to_string().into_bytes());
            self
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> Result<Vec<u8>, ClientError> {
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| ClientError::Status {
                    status: 404,
                    url: url.to_string(),
                    message: "not found".to_string(),
                })
        }
    }

    #[test]
    fn test_mock_client() {
        let mock = MockHttpClient::default().with_json("http://x/a", serde_json::json!([1, 2]));
        assert_eq!(mock.get("http://x/a").unwrap(), b"[1,2]".to_vec());
        assert!(mock.get("http://x/b").unwrap_err().is_not_found());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::with_timeout(5).is_ok());
    }
}

//! Token verification.

use std::collections::HashMap;

use futures::future;

use crate::model::UserId;
use crate::store::BoxFuture;

/// Resolves an opaque token to the user it was issued to.
///
/// Implementations wrap whatever authentication service issues tokens.
pub trait TokenVerifier: Send + Sync {
    /// Returns `None` for unknown, expired or malformed tokens.
    fn verify(&self, token: &str) -> BoxFuture<'_, Option<UserId>>;
}

/// Verifier backed by a fixed token table.
///
/// Loaded from the `[tokens]` section of the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a user.
    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<UserId>) -> Self {
        self.tokens.insert(token.into(), user.into());
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, UserId)> for StaticTokenVerifier {
    fn from_iter<I: IntoIterator<Item = (String, UserId)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> BoxFuture<'_, Option<UserId>> {
        let user = if token.is_empty() {
            None
        } else {
            self.tokens.get(token).cloned()
        };
        Box::pin(future::ready(user))
    }
}

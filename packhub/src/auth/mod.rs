//! Caller identity and authorization.
//!
//! Tokens are opaque. A [`TokenVerifier`] maps a token to a [`UserId`]; the
//! policy functions then gate mutations on pack and bundle ownership.
//!
//! # Failure Order
//!
//! ```text
//! no token / unknown token ──► CatalogError::Unauthorized   (401)
//! valid token, wrong party ──► CatalogError::Forbidden      (403)
//! ```
//!
//! Every check runs before the mutation it guards.

mod policy;
mod verifier;

pub use policy::{authenticate, require_bundle_owner, require_contributor, require_owner, Identity};
pub use verifier::{StaticTokenVerifier, TokenVerifier};

//! Blocking client for a running catalog server.
//!
//! Used by the CLI's `browse` and `show` commands. Requests go through the
//! [`HttpClient`] trait so tests can run against canned responses.
//!
//! # Example
//!
//! ```ignore
//! use packhub::client::{CatalogClient, ReqwestClient};
//!
//! let client = CatalogClient::new(ReqwestClient::new()?, "http://localhost:9000");
//! println!("{}", client.pack_card("tcc")?);
//! ```

mod card;
mod catalog;
mod http;

pub use card::PackCard;
pub use catalog::CatalogClient;
pub use http::{ClientError, HttpClient, ReqwestClient};

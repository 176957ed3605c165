//! CLI command implementations.

pub mod browse;
pub mod config;
pub mod init;
pub mod metrics;
pub mod serve;

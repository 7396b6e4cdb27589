//! Logging utilities.
//!
//! Logger initialization over the `log` facade with an `env_logger` backend.

mod init;

pub use init::{init_logging, resolve_filter, LoggingConfig, DEFAULT_FILTER};

//! Library half of the `mattrack` binary: configuration and command handlers.

pub mod commands;
pub mod config;

pub use commands::OutputFormat;
pub use config::{CliConfig, ConfigError};

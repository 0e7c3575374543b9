//! # bot-common
//!
//! Cross-cutting concerns shared by the workspace: configuration loading and
//! tracing setup.

pub mod config;
pub mod telemetry;

pub use config::{AppSettings, BotConfig, ConfigError, Environment, ReconnectConfig};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};

//! Configuration loading

mod bot_config;

pub use bot_config::{AppSettings, BotConfig, ConfigError, Environment, ReconnectConfig};

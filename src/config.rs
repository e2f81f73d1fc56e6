//! Configuration management for logrelay
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a `logrelay.toml` file and merge it with
//! environment variables and command-line arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Configuration for the HTTP ingestion/query server.
    pub server: ServerConfig,
    /// Configuration for the live alert store's retention policy.
    pub retention: RetentionConfig,
    /// Configuration for dashboard queries.
    pub query: QueryConfig,
    /// Configuration for the outbound sinks.
    pub sinks: SinkConfig,
}

/// Configuration for the HTTP server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// The address the server binds to, e.g. `127.0.0.1:5000`.
    pub listen: String,
}

/// Configuration for the live alert store's retention policy.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetentionConfig {
    /// Maximum age of a stored alert before the opportunistic purge removes
    /// it, in seconds.
    pub max_age_seconds: u64,
}

/// Configuration for dashboard queries.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueryConfig {
    /// Page size used when the query omits `page_size`.
    pub default_page_size: usize,
}

/// Configuration for the outbound sinks.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SinkConfig {
    /// Chat-notification webhook. The chat adapter is only registered when
    /// this is present.
    pub chat: Option<ChatSinkConfig>,
}

/// Configuration for the chat-notification webhook.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatSinkConfig {
    /// The webhook URL notifications are POSTed to.
    pub webhook_url: String,
    /// Per-request timeout for the webhook call.
    #[serde(default = "default_chat_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_chat_timeout_ms() -> u64 {
    5_000
}

impl Config {
    /// Loads the application configuration by layering sources: defaults,
    /// the TOML file, environment variables, and CLI arguments. A failure
    /// here is fatal to startup.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| "logrelay.toml".into());
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g.
            // LOGRELAY_LOG_LEVEL=debug
            .merge(Env::prefixed("LOGRELAY_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig {
                listen: "127.0.0.1:5000".to_string(),
            },
            retention: RetentionConfig {
                // Seven days.
                max_age_seconds: 604_800,
            },
            query: QueryConfig {
                default_page_size: 200,
            },
            sinks: SinkConfig::default(),
        }
    }
}

//! The main application logic, decoupled from the entry point.

use crate::config::Config;
use crate::core::SinkAdapter;
use crate::dispatch::Dispatcher;
use crate::server::{ApiServer, ApiState};
use crate::sinks::{ChatClient, ChatClientTrait, ChatSink, SqlSink, StoreSink, SyslogSink};
use crate::store::AlertStore;
use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A handle to the running application.
pub struct App {
    api_addr: SocketAddr,
    server_task: JoinHandle<()>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The address the API server actually bound to. Useful when the
    /// configured port is 0.
    pub fn api_addr(&self) -> SocketAddr {
        self.api_addr
    }

    /// Runs until the server task finishes, which happens when the shutdown
    /// signal passed to [`AppBuilder::build`] fires.
    pub async fn run(self) -> Result<()> {
        if let Err(e) = self.server_task.await {
            error!("API server task panicked: {:?}", e);
        }
        info!("All tasks shut down.");
        Ok(())
    }
}

/// Builder for the main application.
///
/// This pattern allows for a clean separation of concerns between
/// constructing the application's components and running the application. It
/// also provides a convenient way to override components for testing
/// purposes.
pub struct AppBuilder {
    config: Config,
    chat_client_override: Option<Arc<dyn ChatClientTrait>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            chat_client_override: None,
        }
    }

    /// Overrides the chat client for testing.
    pub fn chat_client_override(mut self, client: Arc<dyn ChatClientTrait>) -> Self {
        self.chat_client_override = Some(client);
        self
    }

    /// Builds and initializes all application components, returning a
    /// runnable `App`.
    pub async fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<App> {
        let config = self.config;

        let store = Arc::new(AlertStore::new());
        let max_age_seconds = i64::try_from(config.retention.max_age_seconds)
            .map_err(|_| {
                anyhow!(
                    "retention.max_age_seconds {} is out of range",
                    config.retention.max_age_seconds
                )
            })?;
        let max_age = chrono::Duration::try_seconds(max_age_seconds).ok_or_else(|| {
            anyhow!(
                "retention.max_age_seconds {} is out of range",
                config.retention.max_age_seconds
            )
        })?;

        let mut adapters: Vec<Arc<dyn SinkAdapter>> = Vec::new();
        adapters.push(Arc::new(StoreSink::new(store.clone(), max_age)));

        let chat_client: Option<Arc<dyn ChatClientTrait>> = match self.chat_client_override {
            Some(client) => Some(client),
            None => match config.sinks.chat.as_ref() {
                Some(chat) => Some(Arc::new(ChatClient::new(
                    chat.webhook_url.clone(),
                    Duration::from_millis(chat.timeout_ms),
                )?) as Arc<dyn ChatClientTrait>),
                None => None,
            },
        };
        if let Some(client) = chat_client {
            adapters.push(Arc::new(ChatSink::new(client)));
        }
        adapters.push(Arc::new(SyslogSink));
        adapters.push(Arc::new(SqlSink));

        let dispatcher = Arc::new(Dispatcher::new(adapters));

        let listener = TcpListener::bind(&config.server.listen).await?;
        let api_addr = listener.local_addr()?;
        info!(addr = %api_addr, "API server listening");

        let state = ApiState {
            dispatcher,
            store,
            default_page_size: config.query.default_page_size,
        };
        let server = ApiServer::new(listener, state, shutdown_rx);
        let server_task = tokio::spawn(server.run());

        Ok(App {
            api_addr,
            server_task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn out_of_range_retention_fails_startup_loudly() {
        let mut config = Config::default();
        config.retention.max_age_seconds = u64::MAX;
        config.server.listen = "127.0.0.1:0".to_string();

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let result = AppBuilder::new(config).build(shutdown_rx).await;

        let error = result.err().expect("build should reject the retention value");
        assert!(
            error.to_string().contains("retention.max_age_seconds"),
            "unexpected error: {error}"
        );
    }
}

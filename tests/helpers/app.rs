//! Test helpers for running the full application instance.

use logrelay::{app::AppBuilder, config::Config};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Represents a running instance of the application for testing purposes.
///
/// Boots the real axum server on an ephemeral port and drives it over HTTP.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: watch::Sender<bool>,
    app_handle: JoinHandle<anyhow::Result<()>>,
}

impl TestApp {
    /// Spawns the application with default test configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the application after letting the caller mutate the config.
    /// The listen address is always forced to an ephemeral port.
    pub async fn spawn_with(mutate: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config::default();
        mutate(&mut config);
        config.server.listen = "127.0.0.1:0".to_string();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let app = AppBuilder::new(config)
            .build(shutdown_rx)
            .await
            .expect("failed to build test app");
        let addr = app.api_addr();
        let app_handle = tokio::spawn(app.run());

        Self {
            addr,
            client: reqwest::Client::new(),
            shutdown_tx,
            app_handle,
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub async fn post_log(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/log"))
            .json(body)
            .send()
            .await
            .expect("POST /api/log failed")
    }

    pub async fn get_alerts(&self, query: &[(&str, String)]) -> serde_json::Value {
        let response = self
            .client
            .get(self.url("/api/alerts"))
            .query(query)
            .send()
            .await
            .expect("GET /api/alerts failed");
        assert!(response.status().is_success());
        response.json().await.expect("alerts response was not JSON")
    }

    pub async fn health(&self) -> reqwest::Response {
        self.client
            .get(self.url("/api/health"))
            .send()
            .await
            .expect("GET /api/health failed")
    }

    /// Shuts down the application and waits for it to terminate.
    pub async fn shutdown(self) {
        self.shutdown_tx
            .send(true)
            .expect("failed to send shutdown signal");
        timeout(Duration::from_secs(5), self.app_handle)
            .await
            .expect("app did not shut down in time")
            .expect("app task panicked")
            .expect("app returned an error");
    }
}

/// A valid store-only envelope, matching the dashboard's canonical example.
pub fn store_envelope(source: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "source": source,
        "destination": ["store"],
        "log": {
            "category": "auth",
            "alert": "login_fail",
            "severity": "high",
            "timestamp": "2024-01-01T00:00:00Z",
            "message": message
        }
    })
}

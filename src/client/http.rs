//! Remote entitlement client: the network boundary of this crate.
//!
//! The controller only ever sees the [`EntitlementClient`] trait; the
//! production implementation speaks HTTPS through a blocking reqwest
//! client that owns its own connect/request timeouts. Tests substitute a
//! mock through the same trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::config::SkygateConfig;
use crate::errors::SkygateError;

/// Default entitlement service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "https://entitlements.skygate.dev";

/// Request timeout for service calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote entitlement service as consumed by the authentication controller.
pub trait EntitlementClient: Send + Sync {
    /// Try to establish connectivity, recording the result for
    /// [`is_server_available`](Self::is_server_available). May block; the
    /// controller calls it from its background task, never the host thread.
    fn initialize_connection(&self);

    /// Whether the service was reachable as of the last
    /// [`initialize_connection`](Self::initialize_connection) call.
    /// Polled once per authentication cycle.
    fn is_server_available(&self) -> bool;

    /// Fetch the raw structured entitlement record for an API key.
    fn fetch_user_record(&self, api_key: &str) -> Result<String, SkygateError>;
}

/// Production client backed by blocking reqwest.
pub struct HttpEntitlementClient {
    client: Client,
    base_url: String,
    user_agent: String,
    available: AtomicBool,
}

impl HttpEntitlementClient {
    /// Create a client from crate configuration.
    pub fn new(config: &SkygateConfig) -> Result<Self, SkygateError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SkygateError::Transport(format!("failed to create client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
            user_agent: build_user_agent(config),
            available: AtomicBool::new(false),
        })
    }

    /// The configured service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl EntitlementClient for HttpEntitlementClient {
    fn initialize_connection(&self) {
        let url = format!("{}/v1/ping", self.base_url);
        let reachable = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false);

        self.available.store(reachable, Ordering::Release);
        tracing::debug!(reachable, "entitlement service probe finished");
    }

    fn is_server_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn fetch_user_record(&self, api_key: &str) -> Result<String, SkygateError> {
        if !self.is_server_available() {
            return Err(SkygateError::NetworkUnavailable);
        }

        let url = format!("{}/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header("X-Api-Key", api_key)
            .send()
            .map_err(|e| SkygateError::Transport(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SkygateError::Transport(format!(
                "service returned {}",
                response.status()
            )));
        }

        response
            .text()
            .map_err(|e| SkygateError::Transport(format!("failed to read body: {e}")))
    }
}

/// Build a User-Agent string: `<app>/skygate-<version>`.
pub fn build_user_agent(config: &SkygateConfig) -> String {
    format!("{}/skygate-{}", config.app_name, env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> SkygateConfig {
        SkygateConfig {
            app_name: "towersim",
            data_namespace: "towersim",
            settings_path: PathBuf::from("settings.toml"),
            service_url: "https://entitlements.example/".to_string(),
        }
    }

    #[test]
    fn test_build_user_agent() {
        let ua = build_user_agent(&test_config());
        assert!(ua.starts_with("towersim/skygate-"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = HttpEntitlementClient::new(&test_config()).unwrap();
        assert_eq!(client.base_url(), "https://entitlements.example");
    }

    #[test]
    fn test_unavailable_before_initialization() {
        let client = HttpEntitlementClient::new(&test_config()).unwrap();
        assert!(!client.is_server_available());
    }

    #[test]
    fn test_fetch_without_connectivity_is_unavailable() {
        // No probe has run, so the fetch refuses without touching the network.
        let client = HttpEntitlementClient::new(&test_config()).unwrap();
        let result = client.fetch_user_record("key");
        assert!(matches!(result, Err(SkygateError::NetworkUnavailable)));
    }
}

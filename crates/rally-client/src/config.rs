//! Client configuration.

use rally_core::LinkConfig;

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default WebSocket path.
pub const DEFAULT_PATH: &str = "/ws";

/// Build a `ws://` endpoint URL.
pub fn endpoint_url(host: &str, port: u16, path: &str) -> String {
    format!("ws://{host}:{port}/{}", path.trim_start_matches('/'))
}

/// Everything needed to run a client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server endpoint.
    pub url: String,
    /// Reconnect policy.
    pub link: LinkConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { url: endpoint_url(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PATH), link: LinkConfig::default() }
    }
}

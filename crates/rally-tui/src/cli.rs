//! Command-line configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use rally_client::{ClientConfig, DEFAULT_HOST, DEFAULT_PATH, DEFAULT_PORT, LinkConfig, endpoint_url};
use rally_core::link::DEFAULT_MAX_ATTEMPTS;

/// Rally terminal client
#[derive(Parser, Debug, Clone)]
#[command(name = "rally-tui")]
#[command(about = "Terminal client for the Rally Pong server")]
#[command(version)]
pub struct Args {
    /// Server host
    #[arg(long, env = "RALLY_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port
    #[arg(long, env = "RALLY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// WebSocket path on the server
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,

    /// Full endpoint URL. Overrides host, port and path.
    #[arg(long)]
    pub url: Option<String>,

    /// File that receives log output (the terminal belongs to the UI)
    #[arg(long, default_value = "rally-tui.log")]
    pub log_file: PathBuf,

    /// Log filter, e.g. `info` or `rally_client=debug`
    #[arg(long, env = "RALLY_LOG", default_value = "info")]
    pub log_level: String,

    /// Reconnect attempts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_reconnects: u32,

    /// Seconds to wait for the server's welcome after connecting
    #[arg(long, default_value_t = 10)]
    pub welcome_timeout: u64,

    /// Seconds one connect attempt may take before it counts as failed
    #[arg(long, default_value_t = 5)]
    pub connect_timeout: u64,
}

impl Args {
    /// Endpoint to connect to.
    pub fn endpoint(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => endpoint_url(&self.host, self.port, &self.path),
        }
    }

    /// Session configuration from the arguments.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            url: self.endpoint(),
            link: LinkConfig {
                max_attempts: self.max_reconnects,
                welcome_timeout: Duration::from_secs(self.welcome_timeout),
                connect_timeout: Duration::from_secs(self.connect_timeout),
                ..LinkConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let args = Args::try_parse_from(["rally-tui"]).unwrap();
        let config = args.client_config();

        assert_eq!(config.url, "ws://localhost:8080/ws");
        assert_eq!(config.link, LinkConfig::default());
    }

    #[test]
    fn host_and_port_build_endpoint() {
        let args =
            Args::try_parse_from(["rally-tui", "--host", "pong.lan", "--port", "9000"]).unwrap();
        assert_eq!(args.endpoint(), "ws://pong.lan:9000/ws");
    }

    #[test]
    fn url_overrides_host() {
        let args = Args::try_parse_from([
            "rally-tui",
            "--host",
            "ignored",
            "--url",
            "wss://pong.example/ws",
        ])
        .unwrap();
        assert_eq!(args.endpoint(), "wss://pong.example/ws");
    }

    #[test]
    fn reconnect_budget_configurable() {
        let args = Args::try_parse_from(["rally-tui", "--max-reconnects", "2"]).unwrap();
        assert_eq!(args.client_config().link.max_attempts, 2);
    }

    #[test]
    fn connect_timeout_configurable() {
        let args = Args::try_parse_from(["rally-tui", "--connect-timeout", "2"]).unwrap();
        assert_eq!(args.client_config().link.connect_timeout, Duration::from_secs(2));
    }
}

//! Public tunnel for local development.
//!
//! The provider has to reach the webhook endpoints from the internet. When
//! `tunnel.enabled` is set, the tunnel agent is started as a child process and
//! its public HTTPS address is read from the agent's local inspection API.

use serde::Deserialize;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::config::TunnelConfig;

/// How many times the inspection API is polled before giving up.
const POLL_ATTEMPTS: u32 = 40;

/// Delay between inspection API polls.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("failed to spawn tunnel agent: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("tunnel agent exited early: {0}")]
    Exited(ExitStatus),

    #[error("tunnel did not report a public https URL")]
    Unavailable,
}

#[derive(Debug, Deserialize)]
struct TunnelList {
    #[serde(default)]
    tunnels: Vec<TunnelInfo>,
}

#[derive(Debug, Deserialize)]
struct TunnelInfo {
    public_url: String,
    #[serde(default)]
    proto: String,
}

/// Picks the HTTPS endpoint out of the inspection API listing.
fn select_public_url(list: &TunnelList) -> Option<String> {
    list.tunnels
        .iter()
        .find(|t| t.proto == "https" || t.public_url.starts_with("https://"))
        .map(|t| t.public_url.clone())
}

/// A running tunnel. The agent is killed when this is dropped.
#[derive(Debug)]
pub struct Tunnel {
    child: Child,
    public_url: String,
}

impl Tunnel {
    /// Starts the agent forwarding to `port` and waits for its public URL.
    pub async fn open(config: &TunnelConfig, port: u16) -> Result<Self, TunnelError> {
        let mut command = Command::new(&config.binary);
        command
            .arg("http")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(token) = &config.auth_token {
            command.arg("--authtoken").arg(token);
        }

        let mut child = command.spawn()?;
        let http = reqwest::Client::new();
        let url = format!("{}/api/tunnels", config.inspect_url.trim_end_matches('/'));

        for attempt in 1..=POLL_ATTEMPTS {
            if let Some(status) = child.try_wait()? {
                return Err(TunnelError::Exited(status));
            }
            match fetch_public_url(&http, &url).await {
                Some(public_url) => {
                    tracing::info!(%public_url, port, "tunnel established");
                    return Ok(Self { child, public_url });
                }
                None => {
                    tracing::debug!(attempt, "tunnel not ready yet");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }

        let _ = child.kill().await;
        Err(TunnelError::Unavailable)
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Stops the agent.
    pub async fn close(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!("failed to stop tunnel agent: {}", e);
        }
    }
}

async fn fetch_public_url(http: &reqwest::Client, url: &str) -> Option<String> {
    let response = http.get(url).send().await.ok()?;
    let list: TunnelList = response.json().await.ok()?;
    select_public_url(&list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_https_tunnel() {
        let list: TunnelList = serde_json::from_str(
            r#"{"tunnels":[
                {"public_url":"http://abc.ngrok.app","proto":"http"},
                {"public_url":"https://abc.ngrok.app","proto":"https"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            select_public_url(&list).as_deref(),
            Some("https://abc.ngrok.app")
        );
    }

    #[test]
    fn no_https_tunnel_yields_none() {
        let list: TunnelList =
            serde_json::from_str(r#"{"tunnels":[{"public_url":"tcp://0.tcp.ngrok.io:1","proto":"tcp"}]}"#)
                .unwrap();
        assert!(select_public_url(&list).is_none());

        let empty: TunnelList = serde_json::from_str("{}").unwrap();
        assert!(select_public_url(&empty).is_none());
    }

    #[tokio::test]
    async fn missing_binary_fails_to_spawn() {
        let config = TunnelConfig {
            binary: "/nonexistent/tunnel-agent".to_string(),
            ..TunnelConfig::default()
        };
        let err = Tunnel::open(&config, 5000).await.unwrap_err();
        assert!(matches!(err, TunnelError::Spawn(_)));
    }
}

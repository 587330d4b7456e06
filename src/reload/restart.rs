//! Explicit reload by restarting the proxy container.
//!
//! # Responsibilities
//! - Run `<docker_bin> restart <container>`
//! - Poll the readiness URL until the proxy answers 2xx
//! - Bound the whole operation by the configured timeout
//!
//! # Design Decisions
//! - The child process is killed if the deadline passes
//! - A restart command exiting is not a confirmation; only the readiness URL is

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::ReloadConfig;
use crate::observability::metrics;
use crate::reload::{ProxyControlPlane, ReloadError, ReloadSetupError};

#[derive(Debug, Clone)]
pub struct ContainerRestart {
    docker_bin: String,
    container: String,
    readiness_url: String,
    timeout: Duration,
    poll_interval: Duration,
    client: reqwest::Client,
}

impl ContainerRestart {
    pub fn new(
        docker_bin: impl Into<String>,
        container: impl Into<String>,
        readiness_url: impl Into<String>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(poll_interval.max(Duration::from_millis(200)))
            .build()?;

        Ok(Self {
            docker_bin: docker_bin.into(),
            container: container.into(),
            readiness_url: readiness_url.into(),
            timeout,
            poll_interval,
            client,
        })
    }

    pub fn from_config(config: &ReloadConfig) -> Result<Self, ReloadSetupError> {
        let readiness_url = config
            .readiness_url
            .clone()
            .ok_or(ReloadSetupError::MissingReadinessUrl)?;

        Ok(Self::new(
            &config.docker_bin,
            &config.container,
            readiness_url,
            config.timeout(),
            Duration::from_millis(config.poll_interval_ms),
        )?)
    }

    async fn restart(&self) -> Result<(), ReloadError> {
        let output = Command::new(&self.docker_bin)
            .arg("restart")
            .arg(&self.container)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReloadError::Signal(format!("could not run {}: {}", self.docker_bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReloadError::Signal(format!(
                "{} restart {} exited with {}: {}",
                self.docker_bin,
                self.container,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn wait_ready(&self, url: &str) {
        loop {
            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return,
                Ok(response) => {
                    tracing::debug!(url = %url, status = %response.status(), "Proxy not ready yet");
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Proxy not reachable yet");
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn restart_and_confirm(&self) -> Result<(), ReloadError> {
        self.restart().await?;
        tracing::info!(container = %self.container, "Proxy container restarted");

        self.wait_ready(&self.readiness_url).await;
        tracing::info!(url = %self.readiness_url, "Proxy readiness confirmed");
        Ok(())
    }
}

#[async_trait]
impl ProxyControlPlane for ContainerRestart {
    async fn reload(&self) -> Result<(), ReloadError> {
        let start = Instant::now();

        let outcome = match tokio::time::timeout(self.timeout, self.restart_and_confirm()).await {
            Ok(result) => result,
            Err(_) => Err(ReloadError::Timeout(self.timeout)),
        };

        metrics::record_reload(self.strategy(), outcome.is_ok(), start.elapsed());
        outcome
    }

    fn strategy(&self) -> &'static str {
        "restart"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use axum::{routing::get, Router};

    // Nothing listens on the discard port.
    const DEAD_URL: &str = "http://127.0.0.1:9/ping";

    fn restart_with(bin: &str, readiness_url: &str, timeout_ms: u64) -> ContainerRestart {
        ContainerRestart::new(
            bin,
            "coolify-proxy",
            readiness_url,
            Duration::from_millis(timeout_ms),
            Duration::from_millis(20),
        )
        .unwrap()
    }

    async fn ping_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/ping", get(|| async { "OK" }));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/ping", addr)
    }

    #[tokio::test]
    async fn test_failing_command_is_signal_error() {
        let err = restart_with("false", DEAD_URL, 2_000).reload().await.unwrap_err();
        assert!(matches!(err, ReloadError::Signal(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_signal_error() {
        let err = restart_with("/nonexistent/docker", DEAD_URL, 2_000)
            .reload()
            .await
            .unwrap_err();
        assert!(matches!(err, ReloadError::Signal(_)));
    }

    #[tokio::test]
    async fn test_exited_command_alone_is_not_confirmation() {
        let err = restart_with("true", DEAD_URL, 300).reload().await.unwrap_err();
        assert_eq!(err, ReloadError::Timeout(Duration::from_millis(300)));
    }

    #[tokio::test]
    async fn test_ready_proxy_confirms() {
        let url = ping_server().await;
        assert_eq!(restart_with("true", &url, 2_000).reload().await, Ok(()));
    }

    #[test]
    fn test_from_config_requires_readiness_url() {
        let mut config = ReloadConfig::default();
        assert!(matches!(
            ContainerRestart::from_config(&config),
            Err(ReloadSetupError::MissingReadinessUrl)
        ));

        config.readiness_url = Some(DEAD_URL.into());
        let restart = ContainerRestart::from_config(&config).unwrap();
        assert_eq!(restart.readiness_url, DEAD_URL);
        assert_eq!(restart.timeout, Duration::from_secs(15));
    }
}

//! Reachability probe for the CEMADEN alerts panel.
//!
//! The probe only checks that the panel answers with a 2xx status; the
//! response body is never read.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Failure modes of a panel probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// No response within the configured timeout.
    Timeout(Duration),
    /// Connection, TLS, or non-2xx status.
    Request(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(limit) => write!(f, "timeout após {:?}", limit),
            Self::Request(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

#[async_trait]
pub trait PanelProbe: Send + Sync {
    /// Issue a single GET to `url`. No retries.
    async fn probe(&self, url: &str) -> Result<(), ProbeError>;
}

/// `PanelProbe` backed by a reqwest client with a bounded timeout.
pub struct HttpPanelProbe {
    client: Client,
    timeout: Duration,
}

impl HttpPanelProbe {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cemaden-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl PanelProbe for HttpPanelProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        debug!(url, "Probing alerts panel");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        response.error_for_status().map_err(|e| self.classify(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tokio::net::TcpListener;

    async fn spawn_panel() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/", get(|| async { "<html>painel</html>" }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_probe_succeeds_on_2xx() {
        let base = spawn_panel().await;
        let probe = HttpPanelProbe::new(Duration::from_secs(5)).unwrap();
        assert_eq!(probe.probe(&format!("{}/", base)).await, Ok(()));
    }

    #[tokio::test]
    async fn test_probe_reports_http_status_errors() {
        let base = spawn_panel().await;
        let probe = HttpPanelProbe::new(Duration::from_secs(5)).unwrap();
        match probe.probe(&format!("{}/inexistente", base)).await {
            Err(ProbeError::Request(msg)) => assert!(msg.contains("404"), "got: {}", msg),
            other => panic!("expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_times_out_on_silent_server() {
        // Accepted by the kernel backlog but never answered.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = HttpPanelProbe::new(Duration::from_millis(200)).unwrap();
        let result = probe.probe(&format!("http://{}/", addr)).await;
        assert_eq!(result, Err(ProbeError::Timeout(Duration::from_millis(200))));
        drop(listener);
    }

    #[tokio::test]
    async fn test_probe_reports_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpPanelProbe::new(Duration::from_secs(5)).unwrap();
        let result = probe.probe(&format!("http://{}/", addr)).await;
        assert!(matches!(result, Err(ProbeError::Request(_))));
    }

    #[test]
    fn test_timeout_display_mentions_timeout() {
        let err = ProbeError::Timeout(Duration::from_secs(15));
        assert_eq!(err.to_string(), "timeout após 15s");
    }

    #[test]
    fn test_timeout_display_keeps_sub_second_limits() {
        let err = ProbeError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "timeout após 200ms");

        let err = ProbeError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "timeout após 1.5s");
    }
}

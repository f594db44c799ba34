//! HTTP access to the detection backend.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::detection::{DetectionsPayload, VideoMetrics};
use crate::error::{Error, Result};
use crate::store::TrajectoryStore;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

impl ClientConfig {
    /// Reads `TRACKPATH_BACKEND_URL`, `TRACKPATH_BACKEND_TIMEOUT` (seconds)
    /// and `TRACKPATH_BACKEND_RETRIES`.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("TRACKPATH_BACKEND_URL").unwrap_or(default.base_url),
            timeout: std::env::var("TRACKPATH_BACKEND_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
            max_retries: std::env::var("TRACKPATH_BACKEND_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
        }
    }
}

pub struct DetectionClient {
    http: Client,
    config: ClientConfig,
}

impl DetectionClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { http, config })
    }

    fn url(&self, task_id: &str, resource: &str) -> String {
        format!(
            "{}/videos/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            task_id,
            resource
        )
    }

    async fn get_once(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0;

        loop {
            match self.get_once(url).await {
                Err(err) if is_retryable(&err) && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "request to {} failed (attempt {}), retrying in {:?}: {}",
                        url,
                        attempt + 1,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Raw detections of a task, decoded leniently.
    pub async fn fetch_detections(&self, task_id: &str) -> Result<DetectionsPayload> {
        let body = self.get_text(&self.url(task_id, "trajectories")).await?;

        Ok(DetectionsPayload::from_json(&body))
    }

    /// Trajectories of a task. Any failure is logged and yields an empty store.
    pub async fn fetch_store(&self, task_id: &str) -> TrajectoryStore {
        match self.fetch_detections(task_id).await {
            Ok(payload) => TrajectoryStore::from_payload(&payload),
            Err(err) => {
                warn!("failed to fetch trajectories for task {}: {}", task_id, err);
                TrajectoryStore::new()
            }
        }
    }

    pub async fn fetch_metrics(&self, task_id: &str) -> Result<VideoMetrics> {
        let body = self.get_text(&self.url(task_id, "metrics")).await?;

        Ok(serde_json::from_str(&body)?)
    }
}

fn is_retryable(err: &Error) -> bool {
    match err {
        Error::Http(e) => e.is_timeout() || e.is_connect(),
        Error::Status { status, .. } => *status >= 500,
        _ => false,
    }
}

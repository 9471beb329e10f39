//! Transport to the batch enrichment service.
//!
//! The coordinator only sees [`EnrichTransport`]; [`HttpTransport`] is the
//! production implementation and tests substitute in-process fakes.
use super::protocol::{BatchRequest, BatchResponse, HealthResponse, BATCH_PATH, HEALTH_PATH};
use crate::config::EnrichConfig;
use crate::error::EnrichError;
use std::time::{Duration, Instant};

/// Narrow interface the coordinator depends on.
pub trait EnrichTransport: Send + Sync {
    /// Send one batch request. Any non-success reply is an error.
    fn enrich_batch(&self, request: &BatchRequest) -> Result<BatchResponse, EnrichError>;

    fn health(&self) -> Result<HealthResponse, EnrichError>;
}

impl<T: EnrichTransport + ?Sized> EnrichTransport for &T {
    fn enrich_batch(&self, request: &BatchRequest) -> Result<BatchResponse, EnrichError> {
        (**self).enrich_batch(request)
    }

    fn health(&self) -> Result<HealthResponse, EnrichError> {
        (**self).health()
    }
}

/// JSON-over-HTTP transport with a bounded overall timeout.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &EnrichConfig) -> Self {
        Self::new(&config.endpoint, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl EnrichTransport for HttpTransport {
    fn enrich_batch(&self, request: &BatchRequest) -> Result<BatchResponse, EnrichError> {
        let url = self.url(BATCH_PATH);
        let start = Instant::now();
        let mut response = self
            .agent
            .post(&url)
            .send_json(request)
            .map_err(|err| EnrichError::Transport(err.to_string()))?;
        let status = response.status();

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            status = status.as_u16(),
            rows = request.rows.len(),
            "batch enrichment call complete"
        );

        if !status.is_success() {
            return Err(EnrichError::Status {
                code: status.as_u16(),
            });
        }
        response
            .body_mut()
            .read_json::<BatchResponse>()
            .map_err(|err| EnrichError::MalformedResponse(err.to_string()))
    }

    fn health(&self) -> Result<HealthResponse, EnrichError> {
        let url = self.url(HEALTH_PATH);
        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|err| EnrichError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Status {
                code: status.as_u16(),
            });
        }
        response
            .body_mut()
            .read_json::<HealthResponse>()
            .map_err(|err| EnrichError::MalformedResponse(err.to_string()))
    }
}

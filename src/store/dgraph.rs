use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client as HttpClient;
use tracing::{debug, instrument};

use super::AuthoritativeStore;
use super::error::{StoreError, StoreResult};
use super::query::{QueryRequest, parse_lookup_response};
use crate::config::ConfigError;

const MAX_ERROR_BODY: usize = 512;

/// Dgraph HTTP client spreading read-only queries over several Alphas.
pub struct DgraphStore {
    http: Mutex<Option<HttpClient>>,
    endpoints: Vec<String>,
    next: AtomicUsize,
    filter_by_type: bool,
}

impl DgraphStore {
    /// Creates a client for `endpoints` (e.g. `http://localhost:8080`).
    pub fn new(endpoints: Vec<String>, timeout: Duration) -> Result<Self, ConfigError> {
        if endpoints.is_empty() {
            return Err(ConfigError::NoDgraphEndpoints);
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        let endpoints = endpoints
            .into_iter()
            .map(|url| url.trim_end_matches('/').to_string())
            .collect();

        Ok(Self {
            http: Mutex::new(Some(http)),
            endpoints,
            next: AtomicUsize::new(0),
            filter_by_type: false,
        })
    }

    /// Restricts matches to nodes whose `dgraph.type` is the namespace.
    pub fn with_type_filter(mut self, enabled: bool) -> Self {
        self.filter_by_type = enabled;
        self
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn filters_by_type(&self) -> bool {
        self.filter_by_type
    }

    /// Picks the next Alpha in round-robin order.
    pub fn next_endpoint(&self) -> &str {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        &self.endpoints[index]
    }

    fn client(&self) -> StoreResult<HttpClient> {
        self.http.lock().clone().ok_or(StoreError::Closed)
    }
}

impl std::fmt::Debug for DgraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DgraphStore")
            .field("endpoints", &self.endpoints)
            .field("filter_by_type", &self.filter_by_type)
            .field("open", &self.http.lock().is_some())
            .finish()
    }
}

impl AuthoritativeStore for DgraphStore {
    #[instrument(skip(self), fields(endpoint))]
    async fn lookup_by_field(
        &self,
        namespace: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<String>> {
        let request = QueryRequest::lookup(namespace, field, value, self.filter_by_type)?;
        let http = self.client()?;
        let endpoint = self.next_endpoint();
        tracing::Span::current().record("endpoint", endpoint);

        let url = format!("{endpoint}/query?ro=true");
        let response = http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::Transport {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| StoreError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let mut text = String::from_utf8_lossy(&body).into_owned();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(StoreError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let uid = parse_lookup_response(&body)?;
        debug!(found = uid.is_some(), "Authoritative lookup complete");
        Ok(uid)
    }

    async fn close(&self) -> StoreResult<()> {
        self.http.lock().take();
        Ok(())
    }
}

//! HTTP clients for the central server API.
//!
//! Two small clients over one shared configuration: [`HttpLogClient`] posts
//! decided events to the log endpoint, [`HttpRegistryClient`] fetches the
//! collaborator registry for replica rebuilds. Both assume an authenticated
//! plain-HTTP channel; the bearer token is obtained out-of-band.

use crate::error::{SyncError, SyncResult};
use crate::transport::{AccessLogBody, DeliveryOutcome, LogSink, RegistrySource};
use gatehouse_core::constants::{DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_MS};
use gatehouse_core::{AccessEvent, CollaboratorRecord, TagId};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Configuration for the central server API
///
/// # Example
///
/// ```
/// use gatehouse_sync::ApiConfig;
/// use std::time::Duration;
///
/// let config = ApiConfig::new("http://192.168.0.100:5000/api")
///     .bearer_token("device-token")
///     .timeout(Duration::from_millis(5000));
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `http://localhost:5000/api`
    pub base_url: String,

    /// Bearer token for authenticated endpoints (obtained out-of-band)
    pub bearer_token: Option<String>,

    /// Timeout for each HTTP request
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            bearer_token: None,
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    /// Create a configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the bearer token
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn build_client(config: &ApiConfig) -> SyncResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {e}")))
}

/// HTTP client for the remote log endpoint (`POST /api/logs/access`)
pub struct HttpLogClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpLogClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: ApiConfig) -> SyncResult<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }
}

impl LogSink for HttpLogClient {
    async fn deliver(&self, event: &AccessEvent) -> SyncResult<DeliveryOutcome> {
        let body = AccessLogBody::from(event);
        let url = self.config.endpoint("logs/access");

        trace!(event_id = %event.event_id, %url, "delivering access event");

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(event_id = %event.event_id, "event delivered");
            Ok(DeliveryOutcome::Delivered)
        } else if status == StatusCode::CONFLICT {
            // the server already has this idempotency key
            debug!(event_id = %event.event_id, "event already delivered");
            Ok(DeliveryOutcome::AlreadyDelivered)
        } else if status.is_client_error() {
            warn!(event_id = %event.event_id, %status, "event rejected by server");
            Ok(DeliveryOutcome::Rejected {
                status: status.as_u16(),
            })
        } else {
            Err(SyncError::unreachable(format!("server returned {status}")))
        }
    }
}

/// Wire representation of one registry record from `GET /api/collaborators`.
#[derive(Debug, Deserialize)]
struct CollaboratorWire {
    id: i64,
    name: String,
    rfid_tag: String,
    has_access: bool,
}

/// HTTP client for the registry refresh endpoint (`GET /api/collaborators`)
pub struct HttpRegistryClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpRegistryClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: ApiConfig) -> SyncResult<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }
}

impl RegistrySource for HttpRegistryClient {
    async fn fetch_all(&self) -> SyncResult<Vec<CollaboratorRecord>> {
        let url = self.config.endpoint("collaborators");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::unreachable(format!(
                "registry returned {status}"
            )));
        }

        let wire: Vec<CollaboratorWire> = response
            .json()
            .await
            .map_err(|e| SyncError::invalid_response(e.to_string()))?;

        // a malformed tag in one record must not poison the whole refresh
        let mut records = Vec::with_capacity(wire.len());
        for entry in wire {
            match TagId::new(&entry.rfid_tag) {
                Ok(tag) => records.push(CollaboratorRecord {
                    id: entry.id,
                    name: entry.name,
                    tag,
                    has_access: entry.has_access,
                }),
                Err(e) => {
                    warn!(id = entry.id, tag = %entry.rfid_tag, error = %e,
                        "skipping registry record with invalid tag");
                }
            }
        }

        Ok(records)
    }
}

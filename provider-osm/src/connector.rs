//! OSM trace API connector implementation
//!
//! Implements the `TraceApi` trait against the OSM API 0.6 GPS trace
//! endpoints.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::traces::{TraceApi, TraceData, TraceDetails};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::OsmError;
use crate::types::GpxDetailsResponse;

/// Default OSM API base URL
pub const DEFAULT_API_BASE: &str = "https://api.openstreetmap.org/api/0.6";

/// Content type assumed when the data endpoint omits the header
const DEFAULT_DATA_CONTENT_TYPE: &str = "application/gpx+xml";

/// OSM trace API connector
///
/// Implements `TraceApi` over an injected `HttpClient` using HTTP basic
/// auth. Trace metadata is read from the JSON details endpoint; the raw
/// payload comes from the data endpoint in whatever format it was uploaded.
///
/// # Example
///
/// ```ignore
/// use provider_osm::OsmTraceClient;
/// use bridge_traits::traces::TraceApi;
///
/// let client = OsmTraceClient::new(http_client, None, "user", "pass");
/// let details = client.fetch_trace_details(2275154).await?;
/// ```
pub struct OsmTraceClient {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// API base URL, without trailing slash
    base_url: String,

    /// Basic auth credentials
    username: String,
    password: String,
}

impl OsmTraceClient {
    /// Create a new OSM trace API connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - API base URL override; `None` uses the public API
    /// * `username` / `password` - basic auth credentials
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: Option<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            http_client,
            base_url,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build the basic auth header value
    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", BASE64.encode(credentials))
    }

    /// Parse RFC 3339 timestamp into a UTC datetime
    fn parse_timestamp(rfc3339: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(rfc3339)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Convert an API trace record to the bridge-level details type
    fn convert_trace(trace: crate::types::GpxTrace) -> TraceDetails {
        let timestamp = trace.timestamp.as_deref().and_then(Self::parse_timestamp);

        TraceDetails {
            id: trace.id,
            name: trace.name,
            osm_user: trace.user,
            timestamp,
            tags: trace.tags,
        }
    }

    /// Execute an authenticated GET against the API
    async fn get(&self, url: String) -> Result<HttpResponse> {
        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json");

        self.http_client.execute(request).await
    }
}

#[async_trait]
impl TraceApi for OsmTraceClient {
    async fn fetch_trace_details(&self, trace_id: i64) -> Result<Option<TraceDetails>> {
        let url = format!("{}/gpx/{}/details.json", self.base_url, trace_id);
        let response = self.get(url.clone()).await?;

        match response.status {
            // Missing and not-publicly-readable are the same outcome for
            // the caller: there is no public trace at this id.
            403 | 404 | 410 => {
                debug!(trace_id, status = response.status, "Trace not publicly readable");
                Ok(None)
            }
            401 => {
                Err(OsmError::AuthenticationFailed(format!("HTTP 401 for {}", url)).into())
            }
            status if response.is_success() => {
                let details: GpxDetailsResponse = serde_json::from_slice(&response.body)
                    .map_err(|e| OsmError::ParseError(e.to_string()))?;

                debug!(trace_id, status, "Fetched trace details");
                Ok(Some(Self::convert_trace(details.trace)))
            }
            status => {
                warn!(trace_id, status, "Unexpected status for trace details");
                Err(OsmError::ApiError {
                    status_code: status,
                    url,
                }
                .into())
            }
        }
    }

    async fn fetch_trace_data(&self, trace_id: i64) -> Result<TraceData> {
        let url = format!("{}/gpx/{}/data", self.base_url, trace_id);
        let response = self.get(url.clone()).await?;

        if !response.is_success() {
            warn!(trace_id, status = response.status, "Trace data fetch failed");
            return Err(OsmError::ApiError {
                status_code: response.status,
                url,
            }
            .into());
        }

        let content_type = response
            .header("Content-Type")
            .unwrap_or(DEFAULT_DATA_CONTENT_TYPE)
            .to_string();

        debug!(
            trace_id,
            content_type = %content_type,
            bytes = response.body.len(),
            "Fetched trace data"
        );

        Ok(TraceData {
            content_type,
            body: response.body,
        })
    }
}

//! Remote Trace API Abstraction
//!
//! Provides a platform-agnostic trait for the remote trace-hosting API:
//! probing trace metadata by numeric id and downloading raw trace payloads.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata of a publicly readable trace, as reported by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDetails {
    /// The trace id assigned by the remote system
    pub id: i64,
    /// The uploaded file name
    pub name: String,
    /// Account handle of the owning user
    pub osm_user: String,
    /// Upload timestamp as reported remotely
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-text tags attached to the trace
    pub tags: Vec<String>,
}

/// Raw trace payload with its content type
#[derive(Debug, Clone)]
pub struct TraceData {
    pub content_type: String,
    pub body: Bytes,
}

/// Remote trace API client trait
///
/// Both calls may fail or time out per call; the caller is responsible for
/// rate limiting and for mapping transport failures into domain outcomes.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::traces::TraceApi;
///
/// async fn probe(api: &dyn TraceApi, id: i64) -> Result<bool> {
///     Ok(api.fetch_trace_details(id).await?.is_some())
/// }
/// ```
#[async_trait]
pub trait TraceApi: Send + Sync {
    /// Fetch the metadata of a trace by its remote id
    ///
    /// # Returns
    /// - `Ok(Some(details))` if the trace exists and is publicly readable
    /// - `Ok(None)` if the trace does not exist or is not publicly readable
    /// - `Err` on transport failure
    async fn fetch_trace_details(&self, trace_id: i64) -> Result<Option<TraceDetails>>;

    /// Download the raw payload of a trace by its remote id
    ///
    /// # Errors
    /// Returns an error if the trace is not readable or the download fails.
    async fn fetch_trace_data(&self, trace_id: i64) -> Result<TraceData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_data_holds_body() {
        let data = TraceData {
            content_type: "application/gpx+xml".to_string(),
            body: Bytes::from_static(b"<gpx/>"),
        };
        assert_eq!(data.content_type, "application/gpx+xml");
        assert_eq!(&data.body[..], b"<gpx/>");
    }
}

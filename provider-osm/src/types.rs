//! OSM API response types
//!
//! Serde models for the JSON bodies returned by the OSM API 0.6 GPS trace
//! endpoints.

use serde::Deserialize;

/// Envelope returned by `GET /api/0.6/gpx/{id}/details.json`
#[derive(Debug, Clone, Deserialize)]
pub struct GpxDetailsResponse {
    pub trace: GpxTrace,
}

/// A single GPS trace as described by the OSM API
#[derive(Debug, Clone, Deserialize)]
pub struct GpxTrace {
    pub id: i64,
    pub name: String,
    pub user: String,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details_response() {
        let json = r#"{
            "version": "0.6",
            "generator": "OpenStreetMap server",
            "trace": {
                "id": 2275154,
                "name": "morning-ride.gpx",
                "uid": 12345,
                "user": "mapper",
                "visibility": "public",
                "pending": false,
                "timestamp": "2020-09-13T12:26:40Z",
                "lat": 51.5074,
                "lon": -0.1278,
                "description": "Morning commute",
                "tags": ["commute", "bike"]
            }
        }"#;

        let parsed: GpxDetailsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.trace.id, 2275154);
        assert_eq!(parsed.trace.user, "mapper");
        assert_eq!(parsed.trace.tags, vec!["commute", "bike"]);
    }

    #[test]
    fn test_parse_details_response_minimal() {
        let json = r#"{"trace": {"id": 7, "name": "a.gpx", "user": "m"}}"#;

        let parsed: GpxDetailsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.trace.id, 7);
        assert!(parsed.trace.timestamp.is_none());
        assert!(parsed.trace.tags.is_empty());
    }
}

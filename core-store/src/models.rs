//! Domain models for the trace store
//!
//! This module contains the `User` and `Track` models along with the two
//! state machines a track moves through: its remote visibility
//! classification ([`TraceState`]) and its payload synchronization state
//! ([`SyncState`]).

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// State Types
// =============================================================================

/// Remote visibility classification of a track.
///
/// ```text
/// Unknown ──→ Public    (direct successful probe)
///    │
///    └─────→ Private    (reconciliation: a later id was confirmed public)
/// ```
///
/// No transition ever leaves `Public` or `Private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceState {
    /// Not yet probed, or probed but not classified
    Unknown,
    /// Probed, confirmed to exist but not publicly readable
    Private,
    /// Probed, confirmed public, metadata captured
    Public,
}

impl TraceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceState::Unknown => "unknown",
            TraceState::Private => "private",
            TraceState::Public => "public",
        }
    }
}

impl FromStr for TraceState {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" => Ok(TraceState::Unknown),
            "private" => Ok(TraceState::Private),
            "public" => Ok(TraceState::Public),
            other => Err(StoreError::InvalidTraceState(other.to_string())),
        }
    }
}

impl fmt::Display for TraceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload synchronization state of a track.
///
/// `Unknown` means no attempt has been made. `GpxSynced` and `Error` are both
/// terminal for the synchronizer: an errored track is not retried until the
/// state is reset externally. `Unsuitable` is reserved for downstream
/// consumers; this crate never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No sync attempt recorded
    Unknown,
    /// Payload fetched, compressed and stored
    GpxSynced,
    /// A sync attempt failed
    Error,
    /// Processed but not suitable for synchronization
    Unsuitable,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Unknown => "unknown",
            SyncState::GpxSynced => "gpx_synced",
            SyncState::Error => "error",
            SyncState::Unsuitable => "unsuitable",
        }
    }
}

impl FromStr for SyncState {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" => Ok(SyncState::Unknown),
            "gpx_synced" => Ok(SyncState::GpxSynced),
            "error" => Ok(SyncState::Error),
            "unsuitable" => Ok(SyncState::Unsuitable),
            other => Err(StoreError::InvalidSyncState(other.to_string())),
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Models
// =============================================================================

/// A user of the remote trace-hosting system, created on first encounter of
/// a new account handle.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    /// Surrogate store id
    pub id: i64,
    /// External account handle, unique
    pub osm_user: String,
    /// Local creation time, unix seconds
    pub created_at: i64,
}

/// A track in the remote trace id space.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Surrogate store id
    pub id: i64,
    /// The id assigned by the remote system; the probe coordinate
    pub osm_track_id: i64,
    /// Remote visibility classification
    pub trace_state: TraceState,
    /// Payload synchronization state
    pub sync_state: SyncState,
    /// Owning user, set once the track is classified public
    pub user_id: Option<i64>,
    /// Timestamp of the track as reported remotely, unix seconds
    pub osm_timestamp: Option<i64>,
    /// Free-text tags reported remotely
    pub tags: Option<Vec<String>>,
    /// Uploaded file name reported remotely
    pub file_name: Option<String>,
    /// Gzip-compressed raw payload
    pub gpx_file: Option<Vec<u8>>,
    /// Content type of the raw payload
    pub gpx_content_type: Option<String>,
    /// Local time of the last sync attempt, unix seconds
    pub sync_timestamp: Option<i64>,
}

impl Track {
    /// Tags flattened to a comma-joined string; empty when none are set.
    pub fn tags_joined(&self) -> String {
        match &self.tags {
            Some(tags) => tags.join(","),
            None => String::new(),
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track[{}] osm_id:{}, user_id:{:?}",
            self.id, self.osm_track_id, self.user_id
        )
    }
}

/// Database row representation of a track.
///
/// State columns are TEXT and the tags column is a JSON array; conversion to
/// the domain model validates both.
#[derive(Debug, FromRow)]
pub struct TrackRow {
    pub id: i64,
    pub osm_track_id: i64,
    pub trace_state: String,
    pub sync_state: String,
    pub user_id: Option<i64>,
    pub osm_timestamp: Option<i64>,
    pub tags: Option<String>,
    pub file_name: Option<String>,
    pub gpx_file: Option<Vec<u8>>,
    pub gpx_content_type: Option<String>,
    pub sync_timestamp: Option<i64>,
}

impl TryFrom<TrackRow> for Track {
    type Error = StoreError;

    fn try_from(row: TrackRow) -> Result<Self> {
        let trace_state: TraceState = row.trace_state.parse()?;
        let sync_state: SyncState = row.sync_state.parse()?;
        let tags = match row.tags {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(Track {
            id: row.id,
            osm_track_id: row.osm_track_id,
            trace_state,
            sync_state,
            user_id: row.user_id,
            osm_timestamp: row.osm_timestamp,
            tags,
            file_name: row.file_name,
            gpx_file: row.gpx_file,
            gpx_content_type: row.gpx_content_type,
            sync_timestamp: row.sync_timestamp,
        })
    }
}

/// Encode tags for the JSON TEXT column.
pub(crate) fn encode_tags(tags: &[String]) -> Result<String> {
    Ok(serde_json::to_string(tags)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_state_round_trip() {
        for state in [TraceState::Unknown, TraceState::Private, TraceState::Public] {
            assert_eq!(state.as_str().parse::<TraceState>().unwrap(), state);
        }
        assert!("bogus".parse::<TraceState>().is_err());
    }

    #[test]
    fn test_sync_state_round_trip() {
        for state in [
            SyncState::Unknown,
            SyncState::GpxSynced,
            SyncState::Error,
            SyncState::Unsuitable,
        ] {
            assert_eq!(state.as_str().parse::<SyncState>().unwrap(), state);
        }
        assert!("bogus".parse::<SyncState>().is_err());
    }

    #[test]
    fn test_track_row_conversion() {
        let row = TrackRow {
            id: 1,
            osm_track_id: 42,
            trace_state: "public".to_string(),
            sync_state: "unknown".to_string(),
            user_id: Some(7),
            osm_timestamp: Some(1_600_000_000),
            tags: Some(r#"["commute","rain"]"#.to_string()),
            file_name: Some("ride.gpx".to_string()),
            gpx_file: None,
            gpx_content_type: None,
            sync_timestamp: None,
        };

        let track = Track::try_from(row).unwrap();
        assert_eq!(track.trace_state, TraceState::Public);
        assert_eq!(track.sync_state, SyncState::Unknown);
        assert_eq!(track.tags_joined(), "commute,rain");
    }

    #[test]
    fn test_track_row_rejects_bad_state() {
        let row = TrackRow {
            id: 1,
            osm_track_id: 42,
            trace_state: "half-public".to_string(),
            sync_state: "unknown".to_string(),
            user_id: None,
            osm_timestamp: None,
            tags: None,
            file_name: None,
            gpx_file: None,
            gpx_content_type: None,
            sync_timestamp: None,
        };

        assert!(Track::try_from(row).is_err());
    }

    #[test]
    fn test_tags_joined_empty_when_absent() {
        let row = TrackRow {
            id: 1,
            osm_track_id: 2,
            trace_state: "unknown".to_string(),
            sync_state: "unknown".to_string(),
            user_id: None,
            osm_timestamp: None,
            tags: None,
            file_name: None,
            gpx_file: None,
            gpx_content_type: None,
            sync_timestamp: None,
        };
        let track = Track::try_from(row).unwrap();
        assert_eq!(track.tags_joined(), "");
    }
}

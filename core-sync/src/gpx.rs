//! # Payload Synchronizer
//!
//! Downloads and stores the raw payload for public tracks, one track per
//! cycle.
//!
//! Processing a single track per cycle bounds the blast radius of a slow or
//! failing remote call and rate-limits outbound traffic alongside the
//! discovery engine sharing the same remote service.
//!
//! Every cycle ends in exactly one persisted state transition for the
//! selected track: `gpx_synced` on success, `error` on any fetch or
//! compression failure. An errored track is excluded by the eligibility
//! filter and is not retried until its state is reset externally.

use bridge_traits::traces::TraceApi;
use core_store::repositories::TrackRepository;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::error::Result;

/// Outcome of one synchronizer cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No eligible track
    Idle,
    /// Payload stored for the track with this remote id
    Synced(i64),
    /// Attempt failed for the track with this remote id; its sync state is
    /// now `error`
    Failed(i64),
}

/// Fetches and persists raw payloads for public tracks.
pub struct GpxSynchronizer {
    tracks: Arc<dyn TrackRepository>,
    api: Arc<dyn TraceApi>,
}

impl GpxSynchronizer {
    /// Create a new payload synchronizer
    pub fn new(tracks: Arc<dyn TrackRepository>, api: Arc<dyn TraceApi>) -> Self {
        Self { tracks, api }
    }

    /// Run one synchronizer cycle
    ///
    /// Selects at most one public track with no sync attempt and no stored
    /// payload. Fetch and compression failures are recorded on the track
    /// and not propagated.
    ///
    /// # Errors
    ///
    /// Returns an error only on store failure.
    pub async fn run_cycle(&self) -> Result<SyncOutcome> {
        let Some(track) = self.tracks.find_unsynced_public().await? else {
            debug!("No unsynced public track");
            return Ok(SyncOutcome::Idle);
        };

        let attempted_at = now_unix();

        match self.fetch_compressed(track.osm_track_id).await {
            Ok((payload, content_type)) => {
                self.tracks
                    .store_payload(track.id, &payload, &content_type, attempted_at)
                    .await?;

                info!(
                    osm_track_id = track.osm_track_id,
                    bytes = payload.len(),
                    "Synchronized GPX payload"
                );
                Ok(SyncOutcome::Synced(track.osm_track_id))
            }
            Err(e) => {
                self.tracks.mark_sync_error(track.id, attempted_at).await?;

                warn!(
                    osm_track_id = track.osm_track_id,
                    error = %e,
                    "Failed to synchronize GPX payload"
                );
                Ok(SyncOutcome::Failed(track.osm_track_id))
            }
        }
    }

    /// Download the payload and gzip it
    async fn fetch_compressed(&self, osm_track_id: i64) -> Result<(Vec<u8>, String)> {
        let data = self.api.fetch_trace_data(osm_track_id).await?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&data.body)?;
        let compressed = encoder.finish()?;

        Ok((compressed, data.content_type))
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

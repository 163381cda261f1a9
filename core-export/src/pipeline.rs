//! # Export Pipeline
//!
//! Batches every track with an owner and a stored payload into a single
//! GeoJSON feature file.
//!
//! The output is all-or-nothing: features are written to a temporary path
//! and the previous output file is replaced by one atomic rename only after
//! the full batch succeeded. A reader never observes a half-written file;
//! an aborted cycle leaves the prior output intact.
//!
//! A single unreadable or unparsable payload is logged and skipped; only
//! failure to write the destination fails the cycle.

use core_store::repositories::TrackRepository;
use geojson::FeatureCollection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::features::line_features;
use crate::payload::decompress_gpx;

use core_sync::worker::LoopConfig;

/// Export pipeline configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Destination of the feature file
    pub output_path: PathBuf,

    /// Maximum number of tracks per batch; `None` exports everything
    pub max_tracks: Option<i64>,
}

/// Counters reported after each export cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Tracks read from the store
    pub tracks: u64,
    /// Line features written
    pub features: u64,
    /// Tracks skipped because their payload was unreadable or unparsable
    pub skipped: u64,
}

/// Builds the feature file snapshot from the store.
pub struct ExportPipeline {
    tracks: Arc<dyn TrackRepository>,
    config: ExportConfig,
}

impl ExportPipeline {
    /// Create a new export pipeline
    pub fn new(tracks: Arc<dyn TrackRepository>, config: ExportConfig) -> Self {
        Self { tracks, config }
    }

    /// Run one export cycle
    ///
    /// A cancelled cycle returns without touching the output file.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure or on failure to write the
    /// destination path; per-track decode failures are skipped.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<ExportStats> {
        let mut stats = ExportStats::default();

        let tracks = self.tracks.find_exportable(self.config.max_tracks).await?;
        let mut features = Vec::new();

        for track in &tracks {
            if cancel.is_cancelled() {
                info!("Export cycle cancelled, output left untouched");
                return Ok(stats);
            }

            stats.tracks += 1;

            let Some(blob) = track.gpx_file.as_deref() else {
                continue;
            };

            let Some(text) = decompress_gpx(blob) else {
                warn!(track_id = track.id, "Unreadable payload, skipping track");
                stats.skipped += 1;
                continue;
            };

            match line_features(track, &text) {
                Ok(track_features) => {
                    debug!(
                        track_id = track.id,
                        features = track_features.len(),
                        "Decoded track payload"
                    );
                    features.extend(track_features);
                }
                Err(e) => {
                    warn!(
                        track_id = track.id,
                        file_name = track.file_name.as_deref().unwrap_or(""),
                        error = %e,
                        "Failed to parse payload, skipping track"
                    );
                    stats.skipped += 1;
                }
            }
        }

        stats.features = features.len() as u64;

        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        write_atomic(&self.config.output_path, &collection).await?;

        info!(
            tracks = stats.tracks,
            features = stats.features,
            skipped = stats.skipped,
            output = %self.config.output_path.display(),
            "Built output file"
        );
        Ok(stats)
    }
}

/// Write the collection to a temporary sibling path, then rename it over the
/// destination.
///
/// Falls back to delete-then-rename on platforms that refuse to replace an
/// existing file directly.
async fn write_atomic(path: &Path, collection: &FeatureCollection) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let json = serde_json::to_string(collection)?;
    tokio::fs::write(&tmp_path, json).await?;

    if let Err(rename_err) = tokio::fs::rename(&tmp_path, path).await {
        debug!(error = %rename_err, "Direct replace failed, deleting target first");
        let _ = tokio::fs::remove_file(path).await;
        tokio::fs::rename(&tmp_path, path).await?;
    }

    Ok(())
}

/// Run the export pipeline on a fixed interval until cancelled
pub async fn run_export_loop(
    pipeline: ExportPipeline,
    config: LoopConfig,
    cancel: CancellationToken,
) {
    if !config.enabled {
        info!("Export loop disabled");
        return;
    }

    info!(interval_secs = config.interval.as_secs(), "Export loop started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match pipeline.run_cycle(&cancel).await {
            Ok(stats) => debug!(features = stats.features, "Export cycle done"),
            Err(e) => error!(error = %e, "Export cycle failed"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(config.interval) => {}
        }
    }

    info!("Export loop stopped");
}

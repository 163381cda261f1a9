//! # Discovery Engine
//!
//! Advances a classification frontier over the remote trace id space.
//!
//! ## Overview
//!
//! The remote system assigns trace ids monotonically, but only some traces
//! are publicly readable. Each cycle probes a window of candidate ids and
//! classifies every id it passes:
//!
//! - A successful metadata probe classifies the id `public` and captures the
//!   owner, name, timestamp and tags.
//! - A probe that finds nothing records an `unknown` placeholder. The id may
//!   be private, or simply not created yet, so nothing stronger can be
//!   concluded at this point.
//! - Once a *later* id is confirmed public, every unknown id it jumped over
//!   is retroactively reconciled to `private`: the remote id assignment is
//!   append-only, so those ids exist but were not readable.
//!
//! Reconciliation is a bounded sweep issuing one conditional update per id;
//! an id that was concurrently confirmed public is left untouched.
//!
//! Probe failures are not distinguished from "trace does not exist
//! publicly". There is no per-id retry; the next cycle re-evaluates ids at
//! or above the shifting public frontier, while ids already classified
//! `public` or `private` are never revisited.

use bridge_traits::traces::TraceApi;
use core_store::repositories::{TrackRepository, UserRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;

/// Default number of ids probed past the latest unknown id
pub const DEFAULT_LOOKAHEAD_WINDOW: i64 = 10_000;

/// Default pause between two probes
pub const DEFAULT_PROBE_DELAY: Duration = Duration::from_secs(1);

/// Discovery engine configuration
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// How far past the latest unknown id the frontier extends each cycle
    pub lookahead_window: i64,

    /// Pause between two probes, throttling outbound request rate
    pub probe_delay: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            lookahead_window: DEFAULT_LOOKAHEAD_WINDOW,
            probe_delay: DEFAULT_PROBE_DELAY,
        }
    }
}

/// Counters reported after each discovery cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Ids probed this cycle
    pub probed: u64,
    /// Ids confirmed public this cycle
    pub found_public: u64,
    /// Ids recorded as unknown placeholders this cycle
    pub assumed_unknown: u64,
    /// Conditional private updates issued by reconciliation this cycle
    pub reconciled: u64,
}

/// Probes the remote trace id space and keeps the store's classification
/// monotonically advancing with no gaps.
pub struct DiscoveryEngine {
    tracks: Arc<dyn TrackRepository>,
    users: Arc<dyn UserRepository>,
    api: Arc<dyn TraceApi>,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    /// Create a new discovery engine
    pub fn new(
        tracks: Arc<dyn TrackRepository>,
        users: Arc<dyn UserRepository>,
        api: Arc<dyn TraceApi>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            tracks,
            users,
            api,
            config,
        }
    }

    /// Run one discovery cycle
    ///
    /// Cancellation is honored between probes; rows already written stand.
    ///
    /// # Errors
    ///
    /// Returns an error only on store failure; probe failures are collapsed
    /// into the "no public trace at this id" outcome.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<DiscoveryStats> {
        let mut stats = DiscoveryStats::default();

        let mut last_public = self
            .tracks
            .find_latest_public()
            .await?
            .map(|t| t.osm_track_id)
            .unwrap_or(-1);
        let mut last_unknown = self
            .tracks
            .find_latest_unknown()
            .await?
            .map(|t| t.osm_track_id)
            .unwrap_or(0);

        // The probe frontier must stay ahead of the confirmed-public
        // frontier or the scan window collapses.
        if last_public >= last_unknown {
            last_unknown = last_public + 1;
        }

        let frontier = last_unknown + self.config.lookahead_window;
        debug!(last_public, frontier, "Starting discovery cycle");

        for osm_id in (last_public + 1)..=frontier {
            if cancel.is_cancelled() {
                debug!(osm_id, "Discovery cycle cancelled, partial progress retained");
                break;
            }

            stats.probed += 1;

            // A failed probe and "not publicly readable" are the same
            // outcome here; the id stays unknown until a later public id
            // proves otherwise.
            let details = match self.api.fetch_trace_details(osm_id).await {
                Ok(details) => details,
                Err(e) => {
                    debug!(osm_id, error = %e, "Probe failed, treating as absent");
                    None
                }
            };

            match details {
                Some(details) => {
                    let user = self.users.get_or_create(&details.osm_user).await?;
                    self.tracks
                        .upsert_public(
                            user.id,
                            osm_id,
                            details.timestamp.map(|t| t.timestamp()),
                            &details.name,
                            &details.tags,
                        )
                        .await?;

                    // Every id this one jumped over exists but was not
                    // readable: reconcile it to private unless something
                    // else already classified it.
                    for gap_id in (last_public + 1)..osm_id {
                        self.tracks.mark_private_if_unknown(gap_id).await?;
                        stats.reconciled += 1;
                    }

                    last_public = osm_id;
                    stats.found_public += 1;
                    info!(osm_id, user = %details.osm_user, "Found public track");
                }
                None => {
                    self.tracks.get_or_create_unknown(osm_id).await?;
                    stats.assumed_unknown += 1;
                    debug!(osm_id, "Assuming non-public track");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.config.probe_delay) => {}
            }
        }

        info!(
            probed = stats.probed,
            found_public = stats.found_public,
            reconciled = stats.reconciled,
            "Discovery cycle finished"
        );
        Ok(stats)
    }
}

//! Periodic worker loops for the discovery engine and payload synchronizer
//!
//! Each loop owns its timer and talks to the other loops only through the
//! store. A loop never starts a new cycle while its previous cycle is still
//! running; a cycle error is logged and the loop resumes on the next tick.

use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::discovery::DiscoveryEngine;
use crate::gpx::GpxSynchronizer;

/// Schedule of a single periodic worker loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Whether the loop runs at all
    pub enabled: bool,

    /// Pause between two cycles
    pub interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
        }
    }
}

/// Run the discovery engine on a fixed interval until cancelled
pub async fn run_discovery_loop(
    engine: DiscoveryEngine,
    config: LoopConfig,
    cancel: CancellationToken,
) {
    if !config.enabled {
        info!("Discovery loop disabled");
        return;
    }

    info!(interval_secs = config.interval.as_secs(), "Discovery loop started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match engine.run_cycle(&cancel).await {
            Ok(stats) => debug!(
                probed = stats.probed,
                found_public = stats.found_public,
                "Discovery cycle done"
            ),
            Err(e) => error!(error = %e, "Discovery cycle failed"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(config.interval) => {}
        }
    }

    info!("Discovery loop stopped");
}

/// Run the payload synchronizer on a fixed interval until cancelled
pub async fn run_gpx_sync_loop(
    sync: GpxSynchronizer,
    config: LoopConfig,
    cancel: CancellationToken,
) {
    if !config.enabled {
        info!("GPX sync loop disabled");
        return;
    }

    info!(interval_secs = config.interval.as_secs(), "GPX sync loop started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match sync.run_cycle().await {
            Ok(outcome) => debug!(?outcome, "GPX sync cycle done"),
            Err(e) => error!(error = %e, "GPX sync cycle failed"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(config.interval) => {}
        }
    }

    info!("GPX sync loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_config_default_is_enabled() {
        let config = LoopConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval, Duration::from_secs(60));
    }
}

//! # Service Composition
//!
//! Wires the store, the trace API client and the three worker loops into a
//! running service.
//!
//! The loops share nothing but the connection pool: discovery moves rows
//! from `unknown` toward `private`/`public`, payload sync only touches rows
//! already `public`, and export only reads. Shutdown is cooperative: the
//! shared cancellation token is checked between iterations, and in-flight
//! single-row operations complete before a loop exits.

use bridge_desktop::ReqwestHttpClient;
use bridge_traits::traces::TraceApi;
use core_export::{run_export_loop, ExportConfig, ExportPipeline};
use core_store::db::{create_pool, DatabaseConfig};
use core_store::repositories::{SqliteTrackRepository, SqliteUserRepository};
use core_sync::{
    run_discovery_loop, run_gpx_sync_loop, DiscoveryConfig, DiscoveryEngine, GpxSynchronizer,
    LoopConfig,
};
use provider_osm::OsmTraceClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::Result;

/// A running trace synchronization service
pub struct TraceService {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl TraceService {
    /// Build the dependency graph and spawn the worker loops
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or migrated.
    pub async fn start(config: ServiceConfig) -> Result<Self> {
        let pool = create_pool(DatabaseConfig::new(&config.database_path)).await?;

        let tracks = Arc::new(SqliteTrackRepository::new(pool.clone()));
        let users = Arc::new(SqliteUserRepository::new(pool));

        let http_client = Arc::new(ReqwestHttpClient::new(config.user_agent.clone()));
        let api: Arc<dyn TraceApi> = Arc::new(OsmTraceClient::new(
            http_client,
            config.api_base_url.clone(),
            config.api_username.clone(),
            config.api_password.clone(),
        ));

        let cancel = CancellationToken::new();
        let mut handles = Vec::new();

        let discovery = DiscoveryEngine::new(
            tracks.clone(),
            users,
            api.clone(),
            DiscoveryConfig {
                lookahead_window: config.lookahead_window,
                probe_delay: config.probe_delay,
            },
        );
        handles.push(tokio::spawn(run_discovery_loop(
            discovery,
            LoopConfig {
                enabled: config.discovery_enabled,
                interval: config.discovery_interval,
            },
            cancel.clone(),
        )));

        let gpx_sync = GpxSynchronizer::new(tracks.clone(), api);
        handles.push(tokio::spawn(run_gpx_sync_loop(
            gpx_sync,
            LoopConfig {
                enabled: config.gpx_sync_enabled,
                interval: config.gpx_sync_interval,
            },
            cancel.clone(),
        )));

        let export = ExportPipeline::new(
            tracks,
            ExportConfig {
                output_path: config.export_output_path.clone(),
                max_tracks: config.export_max_tracks,
            },
        );
        handles.push(tokio::spawn(run_export_loop(
            export,
            LoopConfig {
                enabled: config.export_enabled,
                interval: config.export_interval,
            },
            cancel.clone(),
        )));

        info!(
            database = %config.database_path.display(),
            "Trace synchronization service started"
        );

        Ok(Self { cancel, handles })
    }

    /// Handle to the service's cancellation token
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cooperative shutdown and wait for every loop to finish
    pub async fn shutdown(self) {
        info!("Shutting down worker loops");
        self.cancel.cancel();

        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker loop terminated abnormally");
            }
        }

        info!("All worker loops stopped");
    }
}

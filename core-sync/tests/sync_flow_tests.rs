//! Integration tests spanning discovery and payload synchronization
//!
//! Drives both engines against one in-memory store the way the daemon runs
//! them: discovery classifies the id space first, the payload synchronizer
//! then drains the public backlog one track per cycle.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::traces::{TraceApi, TraceData, TraceDetails};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use core_store::db::create_test_pool;
use core_store::models::{SyncState, TraceState};
use core_store::repositories::{
    SqliteTrackRepository, SqliteUserRepository, TrackRepository,
};
use core_sync::{DiscoveryConfig, DiscoveryEngine, GpxSynchronizer, SyncOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const GPX_BODY: &[u8] = br#"<?xml version="1.0"?><gpx version="1.0" creator="t"
xmlns="http://www.topografix.com/GPX/1/0"><trk><trkseg>
<trkpt lat="51.0" lon="4.0"></trkpt><trkpt lat="51.1" lon="4.1"></trkpt>
</trkseg></trk></gpx>"#;

/// Remote API double: public traces with payloads, everything else absent.
struct FakeRemote {
    public: HashMap<i64, TraceDetails>,
    data: HashMap<i64, &'static [u8]>,
}

impl FakeRemote {
    fn new(public_ids: &[i64]) -> Self {
        let public = public_ids
            .iter()
            .map(|&id| {
                (
                    id,
                    TraceDetails {
                        id,
                        name: format!("trace-{}.gpx", id),
                        osm_user: "mapper".to_string(),
                        timestamp: Some(Utc.timestamp_opt(1_600_000_000, 0).unwrap()),
                        tags: vec!["commute".to_string()],
                    },
                )
            })
            .collect();
        let data = public_ids.iter().map(|&id| (id, GPX_BODY)).collect();
        Self { public, data }
    }

    fn without_data(mut self, id: i64) -> Self {
        self.data.remove(&id);
        self
    }
}

#[async_trait]
impl TraceApi for FakeRemote {
    async fn fetch_trace_details(&self, trace_id: i64) -> BridgeResult<Option<TraceDetails>> {
        Ok(self.public.get(&trace_id).cloned())
    }

    async fn fetch_trace_data(&self, trace_id: i64) -> BridgeResult<TraceData> {
        match self.data.get(&trace_id) {
            Some(body) => Ok(TraceData {
                content_type: "application/gpx+xml".to_string(),
                body: Bytes::from_static(body),
            }),
            None => Err(BridgeError::OperationFailed("no data".to_string())),
        }
    }
}

async fn build(
    remote: FakeRemote,
    window: i64,
) -> (DiscoveryEngine, GpxSynchronizer, Arc<SqliteTrackRepository>) {
    let pool = create_test_pool().await.unwrap();
    let tracks = Arc::new(SqliteTrackRepository::new(pool.clone()));
    let users = Arc::new(SqliteUserRepository::new(pool));
    let api: Arc<dyn TraceApi> = Arc::new(remote);

    let discovery = DiscoveryEngine::new(
        tracks.clone(),
        users,
        api.clone(),
        DiscoveryConfig {
            lookahead_window: window,
            probe_delay: Duration::ZERO,
        },
    );
    let sync = GpxSynchronizer::new(tracks.clone(), api);

    (discovery, sync, tracks)
}

#[tokio::test]
async fn discovery_then_payload_sync_drains_public_backlog() {
    let (discovery, sync, tracks) = build(FakeRemote::new(&[2, 5]), 8).await;
    let cancel = CancellationToken::new();

    discovery.run_cycle(&cancel).await.unwrap();

    // Two public tracks, both pending payload sync
    let mut synced = Vec::new();
    loop {
        match sync.run_cycle().await.unwrap() {
            SyncOutcome::Synced(id) => synced.push(id),
            SyncOutcome::Failed(id) => panic!("unexpected failure for {}", id),
            SyncOutcome::Idle => break,
        }
    }
    synced.sort_unstable();
    assert_eq!(synced, vec![2, 5]);

    for osm_id in [2, 5] {
        let track = tracks.find_by_osm_id(osm_id).await.unwrap().unwrap();
        assert_eq!(track.trace_state, TraceState::Public);
        assert_eq!(track.sync_state, SyncState::GpxSynced);
        assert!(track.gpx_file.is_some());
        assert!(track.user_id.is_some());
    }

    // The gap ids were reconciled and are never payload-sync candidates
    for osm_id in [0, 1, 3, 4] {
        let track = tracks.find_by_osm_id(osm_id).await.unwrap().unwrap();
        assert_eq!(track.trace_state, TraceState::Private);
        assert_eq!(track.sync_state, SyncState::Unknown);
        assert!(track.gpx_file.is_none());
    }
}

#[tokio::test]
async fn failed_download_parks_track_without_blocking_others() {
    let (discovery, sync, tracks) =
        build(FakeRemote::new(&[1, 3]).without_data(1), 6).await;
    let cancel = CancellationToken::new();

    discovery.run_cycle(&cancel).await.unwrap();

    let mut outcomes = Vec::new();
    loop {
        match sync.run_cycle().await.unwrap() {
            SyncOutcome::Idle => break,
            outcome => outcomes.push(outcome),
        }
    }

    assert!(outcomes.contains(&SyncOutcome::Failed(1)));
    assert!(outcomes.contains(&SyncOutcome::Synced(3)));

    let errored = tracks.find_by_osm_id(1).await.unwrap().unwrap();
    assert_eq!(errored.sync_state, SyncState::Error);

    // The errored track stays parked on subsequent cycles
    assert_eq!(sync.run_cycle().await.unwrap(), SyncOutcome::Idle);
}

#[tokio::test]
async fn repeated_discovery_cycles_are_stable() {
    let (discovery, _sync, tracks) = build(FakeRemote::new(&[4]), 6).await;
    let cancel = CancellationToken::new();

    discovery.run_cycle(&cancel).await.unwrap();
    let after_first = tracks.find_by_osm_id(4).await.unwrap().unwrap();

    discovery.run_cycle(&cancel).await.unwrap();
    let after_second = tracks.find_by_osm_id(4).await.unwrap().unwrap();

    // Same surrogate id, same classification: the public row was updated in
    // place, never duplicated or demoted
    assert_eq!(after_first.id, after_second.id);
    assert_eq!(after_second.trace_state, TraceState::Public);
}

//! # Trace Synchronization Module
//!
//! Discovers tracks in the remote trace id space and synchronizes their raw
//! payloads into the store.
//!
//! ## Components
//!
//! - **Discovery Engine** (`discovery`): probes candidate ids, classifies
//!   them public/private/unknown and reconciles gaps once a later public id
//!   is confirmed
//! - **Payload Synchronizer** (`gpx`): downloads and compresses the payload
//!   of one public track per cycle
//! - **Worker Loops** (`worker`): periodic, cancellable runners for both
//!   engines

pub mod discovery;
pub mod error;
pub mod gpx;
pub mod worker;

pub use discovery::{
    DiscoveryConfig, DiscoveryEngine, DiscoveryStats, DEFAULT_LOOKAHEAD_WINDOW,
    DEFAULT_PROBE_DELAY,
};
pub use error::{Result, SyncError};
pub use gpx::{GpxSynchronizer, SyncOutcome};
pub use worker::{run_discovery_loop, run_gpx_sync_loop, LoopConfig};

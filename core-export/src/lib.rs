//! # Track Export Module
//!
//! Produces a consistent GeoJSON snapshot of every synchronized track.
//!
//! ## Components
//!
//! - **Payload decoding** (`payload`): double-then-single gzip decompression
//!   of stored payload blobs
//! - **Feature conversion** (`features`): GPX text to LineString features
//!   with the per-track attribute set
//! - **Pipeline** (`pipeline`): batch assembly, atomic file replacement and
//!   the periodic worker loop

pub mod error;
pub mod features;
pub mod payload;
pub mod pipeline;

pub use error::{ExportError, Result};
pub use features::line_features;
pub use payload::decompress_gpx;
pub use pipeline::{run_export_loop, ExportConfig, ExportPipeline, ExportStats};

//! # OSM Trace Provider
//!
//! Implements the `TraceApi` trait for the OSM API 0.6 GPS trace endpoints.
//!
//! ## Overview
//!
//! This module provides:
//! - HTTP basic auth against the OSM API
//! - Trace metadata from the JSON details endpoint
//! - Raw payload download with content-type capture
//! - Not-found/forbidden collapsed into "no public trace at this id"

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{OsmTraceClient, DEFAULT_API_BASE};
pub use error::{OsmError, Result};

//! # Trace Service
//!
//! Bootstrap and composition for the trace synchronization daemon.
//!
//! ## Overview
//!
//! This crate wires the concrete pieces together:
//! - SQLite store and repositories from `core-store`
//! - `reqwest`-backed HTTP client from `bridge-desktop`
//! - OSM trace API connector from `provider-osm`
//! - The discovery, payload sync and export worker loops from `core-sync`
//!   and `core-export`
//!
//! The daemon binary (`trace-syncd`) loads [`ServiceConfig`] from the
//! environment, starts a [`TraceService`] and shuts it down cooperatively on
//! SIGINT.

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, ServiceError};
pub use service::TraceService;

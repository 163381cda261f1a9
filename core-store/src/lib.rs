//! # Trace Store
//!
//! SQLite-backed store for users and tracks discovered in the remote trace
//! id space.
//!
//! ## Overview
//!
//! This crate provides:
//! - Connection pooling with WAL mode and embedded migrations (`db`)
//! - Domain models with the track state machines (`models`)
//! - Repository traits and SQLite implementations (`repositories`)
//!
//! The repositories expose exactly the operations the engines are built on;
//! each operation is individually atomic, and state columns only ever move
//! in one direction, which is what makes the three concurrent worker loops
//! safe without cross-loop coordination.

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{Result, StoreError};
pub use models::{SyncState, Track, TraceState, User};
pub use repositories::{
    SqliteTrackRepository, SqliteUserRepository, TrackRepository, UserRepository,
};

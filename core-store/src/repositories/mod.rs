//! Repository traits and SQLite implementations

pub mod track;
pub mod user;

pub use track::{SqliteTrackRepository, TrackRepository};
pub use user::{SqliteUserRepository, UserRepository};

//! Track repository trait and implementation
//!
//! Exposes the store operations the discovery engine, payload synchronizer
//! and export pipeline are built on. Each operation is individually atomic;
//! no multi-row transactions are required because every track's state enums
//! only ever move in one direction.

use crate::error::{Result, StoreError};
use crate::models::{encode_tags, Track, TrackRow};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use tracing::debug;

/// Track repository interface for data access operations
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// The public track with the highest remote id
    async fn find_latest_public(&self) -> Result<Option<Track>>;

    /// The unknown track with the highest remote id
    async fn find_latest_unknown(&self) -> Result<Option<Track>>;

    /// Find a track by its remote id
    async fn find_by_osm_id(&self, osm_track_id: i64) -> Result<Option<Track>>;

    /// Get the track with the given remote id, inserting an `unknown`
    /// placeholder if absent
    ///
    /// Idempotent: calling twice with the same id never creates a duplicate
    /// row and never resets an existing row's state.
    async fn get_or_create_unknown(&self, osm_track_id: i64) -> Result<Track>;

    /// Transition a track to `private` if and only if it is currently
    /// `unknown`
    ///
    /// No-op when the track is missing or already classified. This is the
    /// only mutation path into `private`.
    async fn mark_private_if_unknown(&self, osm_track_id: i64) -> Result<()>;

    /// Insert or overwrite the track as `public` with the captured metadata
    ///
    /// An existing row keeps its payload and sync state; visibility, owner,
    /// remote timestamp, name and tags are overwritten.
    async fn upsert_public(
        &self,
        user_id: i64,
        osm_track_id: i64,
        osm_timestamp: Option<i64>,
        file_name: &str,
        tags: &[String],
    ) -> Result<Track>;

    /// Any single public track with no sync attempt and no stored payload
    async fn find_unsynced_public(&self) -> Result<Option<Track>>;

    /// Store a compressed payload and mark the track `gpx_synced`
    async fn store_payload(
        &self,
        id: i64,
        gpx_file: &[u8],
        content_type: &str,
        synced_at: i64,
    ) -> Result<()>;

    /// Mark a failed sync attempt; the track is no longer eligible for
    /// automatic retry
    async fn mark_sync_error(&self, id: i64, attempted_at: i64) -> Result<()>;

    /// Tracks with an owner and a stored payload, ordered by local id
    /// ascending, optionally capped
    async fn find_exportable(&self, limit: Option<i64>) -> Result<Vec<Track>>;
}

/// SQLite implementation of TrackRepository
pub struct SqliteTrackRepository {
    pool: SqlitePool,
}

impl SqliteTrackRepository {
    /// Create a new SQLite track repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_by_osm_id(&self, osm_track_id: i64) -> Result<Track> {
        self.find_by_osm_id(osm_track_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity_type: "track".to_string(),
                id: osm_track_id.to_string(),
            })
    }
}

#[async_trait]
impl TrackRepository for SqliteTrackRepository {
    async fn find_latest_public(&self) -> Result<Option<Track>> {
        let row = query_as::<_, TrackRow>(
            "SELECT * FROM tracks WHERE trace_state = 'public' \
             ORDER BY osm_track_id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Track::try_from).transpose()
    }

    async fn find_latest_unknown(&self) -> Result<Option<Track>> {
        let row = query_as::<_, TrackRow>(
            "SELECT * FROM tracks WHERE trace_state = 'unknown' \
             ORDER BY osm_track_id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Track::try_from).transpose()
    }

    async fn find_by_osm_id(&self, osm_track_id: i64) -> Result<Option<Track>> {
        let row = query_as::<_, TrackRow>("SELECT * FROM tracks WHERE osm_track_id = ?")
            .bind(osm_track_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Track::try_from).transpose()
    }

    async fn get_or_create_unknown(&self, osm_track_id: i64) -> Result<Track> {
        if let Some(existing) = self.find_by_osm_id(osm_track_id).await? {
            return Ok(existing);
        }

        sqlx::query(
            "INSERT INTO tracks (osm_track_id, trace_state, sync_state) \
             VALUES (?, 'unknown', 'unknown')",
        )
        .bind(osm_track_id)
        .execute(&self.pool)
        .await?;

        debug!(osm_track_id, "Created unknown track placeholder");

        self.fetch_by_osm_id(osm_track_id).await
    }

    async fn mark_private_if_unknown(&self, osm_track_id: i64) -> Result<()> {
        // Single conditional update: a concurrently-discovered public row
        // must not be clobbered.
        sqlx::query(
            "UPDATE tracks SET trace_state = 'private' \
             WHERE osm_track_id = ? AND trace_state = 'unknown'",
        )
        .bind(osm_track_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_public(
        &self,
        user_id: i64,
        osm_track_id: i64,
        osm_timestamp: Option<i64>,
        file_name: &str,
        tags: &[String],
    ) -> Result<Track> {
        let tags_json = encode_tags(tags)?;

        sqlx::query(
            r#"
            INSERT INTO tracks (
                osm_track_id, trace_state, sync_state,
                user_id, osm_timestamp, tags, file_name
            ) VALUES (?, 'public', 'unknown', ?, ?, ?, ?)
            ON CONFLICT (osm_track_id) DO UPDATE SET
                trace_state = 'public',
                user_id = excluded.user_id,
                osm_timestamp = excluded.osm_timestamp,
                tags = excluded.tags,
                file_name = excluded.file_name
            "#,
        )
        .bind(osm_track_id)
        .bind(user_id)
        .bind(osm_timestamp)
        .bind(&tags_json)
        .bind(file_name)
        .execute(&self.pool)
        .await?;

        self.fetch_by_osm_id(osm_track_id).await
    }

    async fn find_unsynced_public(&self) -> Result<Option<Track>> {
        let row = query_as::<_, TrackRow>(
            "SELECT * FROM tracks \
             WHERE trace_state = 'public' AND sync_state = 'unknown' \
               AND gpx_file IS NULL \
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Track::try_from).transpose()
    }

    async fn store_payload(
        &self,
        id: i64,
        gpx_file: &[u8],
        content_type: &str,
        synced_at: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE tracks SET \
                gpx_file = ?, gpx_content_type = ?, \
                sync_state = 'gpx_synced', sync_timestamp = ? \
             WHERE id = ?",
        )
        .bind(gpx_file)
        .bind(content_type)
        .bind(synced_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_sync_error(&self, id: i64, attempted_at: i64) -> Result<()> {
        sqlx::query("UPDATE tracks SET sync_state = 'error', sync_timestamp = ? WHERE id = ?")
            .bind(attempted_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_exportable(&self, limit: Option<i64>) -> Result<Vec<Track>> {
        // LIMIT -1 means unbounded in SQLite
        let rows = query_as::<_, TrackRow>(
            "SELECT * FROM tracks \
             WHERE user_id IS NOT NULL AND gpx_file IS NOT NULL \
             ORDER BY id ASC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Track::try_from).collect()
    }
}

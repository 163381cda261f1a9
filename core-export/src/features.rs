//! GPX text to GeoJSON feature conversion
//!
//! Only line geometries survive: track segments and routes with at least two
//! points become one LineString feature each; waypoints are discarded. Every
//! feature carries the same six attributes describing the owning track.

use core_store::models::Track;
use geo_types::LineString;
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use std::io::Cursor;

/// Owner attribute value when the track has no user
const NO_OWNER: i64 = -1;

/// Remote timestamp attribute value when none was reported
const EPOCH: i64 = 0;

/// Decode GPX text into LineString features tagged with the track's
/// attributes.
///
/// # Errors
///
/// Returns the underlying parse error when the text is not a GPX document.
pub fn line_features(track: &Track, text: &str) -> Result<Vec<Feature>, gpx::errors::GpxError> {
    let document = gpx::read(Cursor::new(text.as_bytes()))?;

    let mut features = Vec::new();

    // Multi-segment tracks are exploded into one feature per segment
    for trk in &document.tracks {
        for line in trk.multilinestring() {
            push_line(&mut features, track, line);
        }
    }

    for route in &document.routes {
        push_line(&mut features, track, route.linestring());
    }

    // Waypoints are point geometries and are dropped entirely

    Ok(features)
}

fn push_line(features: &mut Vec<Feature>, track: &Track, line: LineString<f64>) {
    if line.0.len() < 2 {
        return;
    }

    let coordinates: Vec<Vec<f64>> = line.0.iter().map(|c| vec![c.x, c.y]).collect();

    features.push(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coordinates))),
        id: None,
        properties: Some(attributes(track)),
        foreign_members: None,
    });
}

/// The six per-feature attributes, in table-column order
fn attributes(track: &Track) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("track_id".to_string(), JsonValue::from(track.id));
    properties.insert(
        "osm_track_id".to_string(),
        JsonValue::from(track.osm_track_id),
    );
    properties.insert(
        "user_id".to_string(),
        JsonValue::from(track.user_id.unwrap_or(NO_OWNER) as i32),
    );
    properties.insert(
        "file_name".to_string(),
        JsonValue::from(track.file_name.clone().unwrap_or_default()),
    );
    properties.insert(
        "osm_timestamp".to_string(),
        JsonValue::from(track.osm_timestamp.unwrap_or(EPOCH)),
    );
    properties.insert("tags".to_string(), JsonValue::from(track.tags_joined()));
    properties
}

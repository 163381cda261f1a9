//! Stored payload decompression
//!
//! Historical payload writers were inconsistent: some stored the raw upload
//! gzipped once, some gzipped an already-gzipped upload. Both layouts remain
//! readable: the double-wrapped decode is attempted first, then the
//! single-wrapped one.

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

/// Decode a stored payload blob into GPX text.
///
/// Returns `None` when neither decompression attempt yields non-empty text;
/// the caller decides whether to log and skip.
pub fn decompress_gpx(blob: &[u8]) -> Option<String> {
    // Double-wrapped layout first
    if let Some(text) = read_gzip(GzDecoder::new(GzDecoder::new(blob))) {
        return Some(text);
    }

    debug!("Double-wrapped decode failed, trying single-wrapped");
    read_gzip(GzDecoder::new(blob))
}

fn read_gzip<R: Read>(mut reader: R) -> Option<String> {
    let mut text = String::new();
    match reader.read_to_string(&mut text) {
        Ok(_) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

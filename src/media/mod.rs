//! Captured results
//!
//! The binary outputs of the booth and the in-memory slots that retain
//! the most recent one of each kind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// MIME type of encoded stills.
pub const PHOTO_MIME: &str = "image/jpeg";

/// Container MIME used when the encoder reports none.
pub const DEFAULT_VIDEO_MIME: &str = "video/webm";

/// Kind of captured output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// A finished still image or encoded video clip.
#[derive(Debug, Clone)]
pub struct CapturedResult {
    pub id: Uuid,
    pub kind: MediaKind,
    pub bytes: Arc<Vec<u8>>,
    pub mime_type: String,
    /// Suggested filename for export
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

impl CapturedResult {
    /// Wrap an encoded still image.
    pub fn photo(bytes: Vec<u8>) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind: MediaKind::Photo,
            bytes: Arc::new(bytes),
            mime_type: PHOTO_MIME.to_string(),
            filename: format!("foto-{}.jpg", created_at.timestamp_millis()),
            created_at,
        }
    }

    /// Wrap an assembled video clip, tagged with the encoder's negotiated
    /// MIME type or the default when unset.
    pub fn video(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        let mime_type = mime_type.unwrap_or_else(|| DEFAULT_VIDEO_MIME.to_string());
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind: MediaKind::Video,
            filename: format!(
                "video-{}.{}",
                created_at.timestamp_millis(),
                video_extension(&mime_type)
            ),
            bytes: Arc::new(bytes),
            mime_type,
            created_at,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// File extension for a negotiated video MIME type.
pub fn video_extension(mime_type: &str) -> &'static str {
    if mime_type.contains("mp4") {
        "mp4"
    } else {
        "webm"
    }
}

/// Holds at most one last photo and one last video.
///
/// Setting a slot replaces the previous result; retake clears it.
/// Nothing here survives the process.
#[derive(Default)]
pub struct ResultStore {
    photo: RwLock<Option<CapturedResult>>,
    video: RwLock<Option<CapturedResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: MediaKind) -> &RwLock<Option<CapturedResult>> {
        match kind {
            MediaKind::Photo => &self.photo,
            MediaKind::Video => &self.video,
        }
    }

    /// Retain a result, discarding any previous one of the same kind.
    pub fn set(&self, result: CapturedResult) {
        let slot = self.slot(result.kind);
        let mut guard = slot.write();
        if let Some(previous) = guard.as_ref() {
            tracing::debug!(kind = ?result.kind, replaced = %previous.id, "replacing retained result");
        }
        *guard = Some(result);
    }

    /// The retained result of the given kind, if any.
    pub fn last(&self, kind: MediaKind) -> Option<CapturedResult> {
        self.slot(kind).read().clone()
    }

    pub fn clear(&self, kind: MediaKind) {
        *self.slot(kind).write() = None;
    }

    pub fn clear_all(&self) {
        self.clear(MediaKind::Photo);
        self.clear(MediaKind::Video);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_extension_from_mime() {
        assert_eq!(video_extension("video/webm;codecs=vp9,opus"), "webm");
        assert_eq!(video_extension("video/mp4"), "mp4");
        assert_eq!(video_extension("application/octet-stream"), "webm");
    }

    #[test]
    fn test_video_result_defaults_mime() {
        let result = CapturedResult::video(vec![1, 2, 3], None);
        assert_eq!(result.mime_type, DEFAULT_VIDEO_MIME);
        assert!(result.filename.starts_with("video-"));
        assert!(result.filename.ends_with(".webm"));
    }

    #[test]
    fn test_photo_result_filename() {
        let result = CapturedResult::photo(vec![0xFF, 0xD8]);
        assert_eq!(result.kind, MediaKind::Photo);
        assert_eq!(result.mime_type, PHOTO_MIME);
        assert!(result.filename.starts_with("foto-"));
        assert!(result.filename.ends_with(".jpg"));
    }

    #[test]
    fn test_store_keeps_one_result_per_kind() {
        let store = ResultStore::new();
        assert!(store.last(MediaKind::Photo).is_none());

        let first = CapturedResult::photo(vec![1]);
        let second = CapturedResult::photo(vec![2]);
        let second_id = second.id;
        store.set(first);
        store.set(second);
        let retained = store.last(MediaKind::Photo).unwrap();
        assert_eq!(retained.id, second_id);

        // Kinds are independent slots.
        store.set(CapturedResult::video(vec![3], None));
        assert!(store.last(MediaKind::Photo).is_some());
        assert!(store.last(MediaKind::Video).is_some());

        store.clear(MediaKind::Photo);
        assert!(store.last(MediaKind::Photo).is_none());
        assert!(store.last(MediaKind::Video).is_some());

        store.clear_all();
        assert!(store.last(MediaKind::Video).is_none());
    }
}

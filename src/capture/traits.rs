//! Capture trait definitions
//!
//! Platform-agnostic traits for camera acquisition and live tracks.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GeometryError;
use crate::surface::Frame;

/// Which physical camera is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Front camera; the preview and all output are mirrored.
    User,
    /// Back camera; drawn as-is.
    Environment,
}

impl Facing {
    pub fn toggled(self) -> Self {
        match self {
            Facing::User => Facing::Environment,
            Facing::Environment => Facing::User,
        }
    }

    /// Horizontal-mirror display rule: front camera only.
    pub fn is_mirrored(self) -> bool {
        matches!(self, Facing::User)
    }
}

/// Constraints handed to the camera provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub facing: Facing,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub with_audio: bool,
}

impl CaptureRequest {
    pub fn new(facing: Facing) -> Self {
        Self {
            facing,
            ideal_width: 1920,
            ideal_height: 1080,
            with_audio: true,
        }
    }
}

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera access denied or no matching device: {0}")]
    DeviceAccess(String),

    #[error("still encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Live video track: a source of frames plus a stop control.
pub trait VideoTrack: Send + Sync {
    /// Current frame dimensions; `(0, 0)` until the first frame arrives.
    fn frame_size(&self) -> (u32, u32);

    /// Snapshot of the most recent frame, if any.
    fn current_frame(&self) -> Option<Frame>;

    /// Stop the track and release the underlying device.
    fn stop(&self);
}

/// Live audio track handle; attached to recordings when present.
pub trait AudioTrack: Send + Sync {
    fn stop(&self);
}

/// Acquires a camera/microphone stream by facing preference.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    async fn acquire(&self, request: &CaptureRequest) -> Result<CaptureDevice, CaptureError>;
}

/// The active camera + microphone stream.
///
/// Owned exclusively by the capture session; replaced whenever the
/// facing flips and stopped on teardown.
pub struct CaptureDevice {
    pub facing: Facing,
    pub video: Arc<dyn VideoTrack>,
    pub audio: Option<Arc<dyn AudioTrack>>,
}

impl CaptureDevice {
    pub fn frame_size(&self) -> (u32, u32) {
        self.video.frame_size()
    }

    /// Stop every live track.
    pub fn stop_tracks(&self) {
        self.video.stop();
        if let Some(audio) = &self.audio {
            audio.stop();
        }
    }
}

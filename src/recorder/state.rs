//! Recording state machine types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GeometryError;

/// Current state of the recording system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Currently recording
    Recording,
    /// Stop requested; assembling the result
    Finalizing,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Why an in-progress recording is being stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// User or auto-stop; the result is presented for save/discard.
    Normal,
    /// Finalize, export, then clear.
    Export,
    /// Finalize and clear without exporting.
    Discard,
}

/// One-shot action recorded before stopping, dispatched once
/// finalization completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingAction {
    #[default]
    None,
    Export,
    Discard,
}

impl From<StopReason> for PendingAction {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Normal => PendingAction::None,
            StopReason::Export => PendingAction::Export,
            StopReason::Discard => PendingAction::Discard,
        }
    }
}

/// Fixed parameters of a recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Output surface width in pixels
    pub width: u32,

    /// Output surface height in pixels
    pub height: u32,

    /// Draw-loop and stream frame rate
    pub frame_rate: u32,

    /// Maximum recording duration before the auto-stop fires
    pub max_duration_ms: u64,

    /// Encoder data-delivery interval; small to keep buffering low
    pub timeslice_ms: u64,

    /// Target video bitrate
    pub video_bits_per_second: u32,

    /// Target audio bitrate
    pub audio_bits_per_second: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 1280,
            frame_rate: 30,
            max_duration_ms: 20_000,
            timeslice_ms: 1_000,
            video_bits_per_second: 2_500_000,
            audio_bits_per_second: 128_000,
        }
    }
}

impl RecorderConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_duration_ms)
    }

    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(self.timeslice_ms)
    }
}

/// Ordered encoder container/codec preference, modern formats first.
pub const MIME_CANDIDATES: [&str; 4] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
    "video/mp4",
];

/// Recording errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("camera has no frame to record yet")]
    CameraNotReady,

    #[error("operation rejected while a recording is in progress")]
    RecordingInProgress,

    #[error("platform cannot record from a drawing surface: {0}")]
    UnsupportedPlatform(String),

    #[error("encoder error: {0}")]
    Encoder(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Events emitted during recording
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    /// Recording started
    Started,
    /// Finalization completed and the pending action was dispatched
    Finalized { action: PendingAction },
    /// Error occurred
    Error(String),
}

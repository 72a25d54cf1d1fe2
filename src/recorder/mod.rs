//! Recording system module
//!
//! Implements the framed-clip recording pipeline:
//! - EncoderFactory/MediaEncoder traits for the host encoder
//! - Recorder state machine with auto-stop and pending-action dispatch
//! - The continuous draw loop compositing camera frames with the overlay

pub mod encoder;
pub mod session;
pub mod state;

pub use encoder::{
    negotiate_mime_type, EncodedChunk, EncoderFactory, EncoderOptions, MediaEncoder, SharedSurface,
    SurfaceStream,
};
pub use session::Recorder;
pub use state::{
    PendingAction, RecordError, RecorderConfig, RecorderEvent, RecordingState, StopReason,
    MIME_CANDIDATES,
};

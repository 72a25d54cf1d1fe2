//! Media encoder boundary
//!
//! The host encoder reads the shared composition surface at a fixed
//! frame rate plus an optional live audio track, negotiates a container
//! MIME type from a preference list, and delivers encoded chunks.
//! Chunk order is significant: chunks are appended in arrival order and
//! never reordered or deduplicated.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::state::RecordError;
use crate::capture::AudioTrack;
use crate::surface::FrameBuffer;

/// Shared handle to the off-screen record surface.
pub type SharedSurface = Arc<Mutex<FrameBuffer>>;

/// A chunk of encoded media.
pub type EncodedChunk = Vec<u8>;

/// The stream an encoder consumes: the surface redrawn by the record
/// loop, at a fixed frame rate, plus optional live audio.
#[derive(Clone)]
pub struct SurfaceStream {
    pub surface: SharedSurface,
    pub frame_rate: u32,
    pub audio: Option<Arc<dyn AudioTrack>>,
}

/// Encoder construction parameters.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Negotiated container MIME, or `None` to let the host pick
    pub mime_type: Option<String>,
    pub video_bits_per_second: u32,
    pub audio_bits_per_second: u32,
}

/// A running encoder.
#[async_trait]
pub trait MediaEncoder: Send {
    /// The negotiated container MIME type, if the encoder reports one.
    fn mime_type(&self) -> Option<String>;

    /// Begin encoding, delivering a chunk roughly every `timeslice`.
    async fn start(&mut self, timeslice: Duration) -> Result<(), RecordError>;

    /// Stop encoding. The chunk channel closes once the final data has
    /// been flushed.
    async fn stop(&mut self) -> Result<(), RecordError>;
}

/// Host factory deriving encoders from a drawing surface.
pub trait EncoderFactory: Send + Sync {
    /// Whether this platform can derive a media stream from a drawing
    /// surface at all.
    fn supports_surface_stream(&self) -> bool;

    /// Whether the given container/codec MIME is supported.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Construct an encoder over the stream. Chunks arrive on the
    /// returned receiver in delivery order.
    fn create(
        &self,
        stream: SurfaceStream,
        options: EncoderOptions,
    ) -> Result<(Box<dyn MediaEncoder>, mpsc::UnboundedReceiver<EncodedChunk>), RecordError>;
}

/// First supported MIME from the ordered preference list, if any.
pub fn negotiate_mime_type(factory: &dyn EncoderFactory, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find(|mime| factory.is_type_supported(mime))
        .map(|mime| mime.to_string())
}

//! Shared test doubles for the host platform traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::capture::{
    AudioTrack, CameraProvider, CaptureDevice, CaptureError, CaptureRequest, VideoTrack,
};
use crate::export::{
    BrowserEnvironment, DownloadSink, Exporter, ExportRequest, FileShare, SaveDialog,
};
use crate::overlay::OverlayLoader;
use crate::recorder::{EncodedChunk, EncoderFactory, EncoderOptions, MediaEncoder, SurfaceStream};
use crate::recorder::state::RecordError;
use crate::surface::Frame;

// ---- capture ----

/// Counts track stops across a test.
#[derive(Clone, Default)]
pub struct TrackCounters {
    inner: Arc<Counts>,
}

#[derive(Default)]
struct Counts {
    video: AtomicUsize,
    audio: AtomicUsize,
}

impl TrackCounters {
    pub fn video_stops(&self) -> usize {
        self.inner.video.load(Ordering::SeqCst)
    }

    pub fn audio_stops(&self) -> usize {
        self.inner.audio.load(Ordering::SeqCst)
    }
}

struct StaticVideoTrack {
    width: u32,
    height: u32,
    frame: Option<Frame>,
    counters: TrackCounters,
}

impl VideoTrack for StaticVideoTrack {
    fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn current_frame(&self) -> Option<Frame> {
        self.frame.clone()
    }

    fn stop(&self) {
        self.counters.inner.video.fetch_add(1, Ordering::SeqCst);
    }
}

struct StaticAudioTrack {
    counters: TrackCounters,
}

impl AudioTrack for StaticAudioTrack {
    fn stop(&self) {
        self.counters.inner.audio.fetch_add(1, Ordering::SeqCst);
    }
}

/// Camera provider yielding a fixed solid-gray frame.
pub struct StubCamera {
    width: u32,
    height: u32,
    deny: bool,
    provide_frames: bool,
    counters: TrackCounters,
}

impl StubCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_counters(width, height, TrackCounters::default())
    }

    pub fn with_counters(width: u32, height: u32, counters: TrackCounters) -> Self {
        Self {
            width,
            height,
            deny: false,
            provide_frames: true,
            counters,
        }
    }

    /// A provider whose permission request always fails.
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::new(0, 0)
        }
    }

    /// Acquires fine but never produces a frame.
    pub fn without_frames() -> Self {
        Self {
            provide_frames: false,
            ..Self::new(0, 0)
        }
    }
}

#[async_trait]
impl CameraProvider for StubCamera {
    async fn acquire(&self, request: &CaptureRequest) -> Result<CaptureDevice, CaptureError> {
        if self.deny {
            return Err(CaptureError::DeviceAccess("permission denied".to_string()));
        }
        let frame = self
            .provide_frames
            .then(|| Frame::solid(self.width, self.height, [128, 128, 128, 255]));
        Ok(CaptureDevice {
            facing: request.facing,
            video: Arc::new(StaticVideoTrack {
                width: self.width,
                height: self.height,
                frame,
                counters: self.counters.clone(),
            }),
            audio: request.with_audio.then(|| {
                Arc::new(StaticAudioTrack {
                    counters: self.counters.clone(),
                }) as Arc<dyn AudioTrack>
            }),
        })
    }
}

// ---- overlay ----

/// Loader whose fetch always fails, like a 404'd asset.
pub struct FailingLoader;

#[async_trait]
impl OverlayLoader for FailingLoader {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("{path}: 404 not found")
    }
}

/// Loader serving fixed PNG bytes.
pub struct PngLoader {
    bytes: Vec<u8>,
}

impl PngLoader {
    pub fn white_2x2() -> Self {
        Self {
            bytes: encode_png_rgba(2, 2, &[255; 16]),
        }
    }
}

#[async_trait]
impl OverlayLoader for PngLoader {
    async fn fetch(&self, _path: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

pub fn encode_png_rgb(width: u32, height: u32, rgb: &[u8]) -> Vec<u8> {
    encode_png(width, height, rgb, png::ColorType::Rgb)
}

pub fn encode_png_rgba(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    encode_png(width, height, rgba, png::ColorType::Rgba)
}

fn encode_png(width: u32, height: u32, data: &[u8], color: png::ColorType) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    out
}

// ---- recorder ----

/// Encoder double that delivers scripted chunks, one per timeslice,
/// plus an optional tail chunk on stop.
pub struct ScriptedEncoder {
    mime: Option<String>,
    tx: Option<mpsc::UnboundedSender<EncodedChunk>>,
    periodic: Vec<EncodedChunk>,
    tail: Option<EncodedChunk>,
    delivery: Option<JoinHandle<()>>,
}

#[async_trait]
impl MediaEncoder for ScriptedEncoder {
    fn mime_type(&self) -> Option<String> {
        self.mime.clone()
    }

    async fn start(&mut self, timeslice: Duration) -> Result<(), RecordError> {
        let Some(tx) = self.tx.clone() else {
            return Err(RecordError::Encoder("encoder already stopped".to_string()));
        };
        let chunks = std::mem::take(&mut self.periodic);
        self.delivery = Some(tokio::spawn(async move {
            for chunk in chunks {
                tokio::time::sleep(timeslice).await;
                if tx.send(chunk).is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), RecordError> {
        if let Some(task) = self.delivery.take() {
            task.abort();
        }
        // Dropping the sender closes the chunk channel after the tail.
        if let Some(tx) = self.tx.take() {
            if let Some(tail) = self.tail.take() {
                let _ = tx.send(tail);
            }
        }
        Ok(())
    }
}

/// Factory double with scripted support answers and chunk delivery.
pub struct ScriptedEncoderFactory {
    supported: Option<Vec<String>>,
    surface_stream: bool,
    report_mime: bool,
    periodic: Vec<EncodedChunk>,
    tail: Option<EncodedChunk>,
    created: AtomicUsize,
    seen_options: Mutex<Option<EncoderOptions>>,
}

impl ScriptedEncoderFactory {
    /// Supports every MIME; encoders deliver `periodic` chunks one per
    /// timeslice and `tail` on stop.
    pub fn with_chunks(periodic: Vec<EncodedChunk>, tail: Option<EncodedChunk>) -> Self {
        Self {
            supported: None,
            surface_stream: true,
            report_mime: true,
            periodic,
            tail,
            created: AtomicUsize::new(0),
            seen_options: Mutex::new(None),
        }
    }

    /// Supports exactly one MIME type.
    pub fn supporting(mime: &str) -> Self {
        Self {
            supported: Some(vec![mime.to_string()]),
            ..Self::with_chunks(vec![], None)
        }
    }

    /// A platform that cannot derive a stream from a drawing surface.
    pub fn without_surface_stream() -> Self {
        Self {
            surface_stream: false,
            ..Self::with_chunks(vec![], None)
        }
    }

    /// Encoders never report a negotiated MIME type.
    pub fn without_mime_report(mut self) -> Self {
        self.report_mime = false;
        self
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn seen_options(&self) -> Option<EncoderOptions> {
        self.seen_options.lock().clone()
    }
}

impl EncoderFactory for ScriptedEncoderFactory {
    fn supports_surface_stream(&self) -> bool {
        self.surface_stream
    }

    fn is_type_supported(&self, mime_type: &str) -> bool {
        match &self.supported {
            None => true,
            Some(list) => list.iter().any(|m| m == mime_type),
        }
    }

    fn create(
        &self,
        _stream: SurfaceStream,
        options: EncoderOptions,
    ) -> Result<(Box<dyn MediaEncoder>, mpsc::UnboundedReceiver<EncodedChunk>), RecordError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        *self.seen_options.lock() = Some(options.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let mime = if self.report_mime {
            options.mime_type
        } else {
            None
        };
        Ok((
            Box::new(ScriptedEncoder {
                mime,
                tx: Some(tx),
                periodic: self.periodic.clone(),
                tail: self.tail.clone(),
                delivery: None,
            }),
            rx,
        ))
    }
}

// ---- export ----

/// Share capability double.
pub struct MemoryShare {
    can: bool,
    fail: bool,
    shares: AtomicUsize,
}

impl MemoryShare {
    pub fn sharable() -> Self {
        Self {
            can: true,
            fail: false,
            shares: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            can: false,
            ..Self::sharable()
        }
    }

    /// Claims support but every share attempt fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::sharable()
        }
    }

    pub fn shares(&self) -> usize {
        self.shares.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileShare for MemoryShare {
    fn can_share(&self, _request: &ExportRequest) -> bool {
        self.can
    }

    async fn share(&self, _request: &ExportRequest) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("share sheet dismissed");
        }
        self.shares.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Save-dialog capability double.
pub struct MemoryDialog {
    available: bool,
    fail: bool,
    saves: AtomicUsize,
}

impl MemoryDialog {
    pub fn available() -> Self {
        Self {
            available: true,
            fail: false,
            saves: AtomicUsize::new(0),
        }
    }

    pub fn absent() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::available()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SaveDialog for MemoryDialog {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn save(&self, _request: &ExportRequest) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("picker cancelled");
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Download sink double recording every primitive call.
pub struct MemorySink {
    counter: AtomicUsize,
    blocked_popups: bool,
    failing_downloads: bool,
    log: Mutex<Vec<String>>,
    urls: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            blocked_popups: false,
            failing_downloads: false,
            log: Mutex::new(Vec::new()),
            urls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_blocked_popups(mut self) -> Self {
        self.blocked_popups = true;
        self
    }

    pub fn with_failing_downloads(mut self) -> Self {
        self.failing_downloads = true;
        self
    }

    /// Every primitive call, in order.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// URLs passed to `trigger_download`, in order.
    pub fn downloads(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|entry| entry.strip_prefix("download:").map(str::to_string))
            .collect()
    }

    /// Bytes behind a created URL (kept after revoke for assertions).
    pub fn url_bytes(&self, url: &str) -> Option<Vec<u8>> {
        self.urls.lock().get(url).cloned()
    }
}

impl DownloadSink for MemorySink {
    fn create_url(&self, request: &ExportRequest) -> String {
        let url = format!("blob:{}", self.counter.fetch_add(1, Ordering::SeqCst));
        self.urls.lock().insert(url.clone(), request.bytes.to_vec());
        url
    }

    fn revoke_url(&self, url: &str) {
        self.log.lock().push(format!("revoke:{url}"));
    }

    fn trigger_download(&self, url: &str, _filename: &str) -> anyhow::Result<()> {
        if self.failing_downloads {
            anyhow::bail!("downloads blocked by the environment");
        }
        self.log.lock().push(format!("download:{url}"));
        Ok(())
    }

    fn open_in_new_context(&self, url: &str) -> bool {
        self.log.lock().push(format!("open:{url}"));
        !self.blocked_popups
    }

    fn navigate_current(&self, url: &str) {
        self.log.lock().push(format!("navigate:{url}"));
    }
}

/// An exporter wired so only the direct download applies.
pub fn exporter_with(sink: Arc<MemorySink>) -> Exporter {
    Exporter::new(
        BrowserEnvironment::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"),
        Arc::new(MemoryShare::unavailable()),
        Arc::new(MemoryDialog::absent()),
        sink,
    )
}

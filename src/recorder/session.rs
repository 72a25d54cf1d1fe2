//! Recording session orchestration
//!
//! Coordinates the draw loop, the host encoder, the auto-stop timer,
//! and the pending post-stop action as one state machine:
//! `Idle -> Recording -> Finalizing -> Idle`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

use super::encoder::{
    negotiate_mime_type, EncodedChunk, EncoderFactory, EncoderOptions, MediaEncoder, SharedSurface,
    SurfaceStream,
};
use super::state::{
    PendingAction, RecordError, RecorderConfig, RecorderEvent, RecordingState, StopReason,
    MIME_CANDIDATES,
};
use crate::capture::{CaptureDevice, VideoTrack};
use crate::clock::SessionClock;
use crate::export::{ExportRequest, Exporter};
use crate::geometry::{cover_crop, CropRect};
use crate::media::{CapturedResult, MediaKind, ResultStore};
use crate::overlay::OverlayAsset;
use crate::surface::FrameBuffer;

/// Drives a single recording session at a time.
pub struct Recorder {
    config: RecorderConfig,

    /// Current recording state
    state: Arc<RwLock<RecordingState>>,

    /// Elapsed-time display for the active session
    clock: Arc<Mutex<SessionClock>>,

    /// Event broadcaster
    event_tx: broadcast::Sender<RecorderEvent>,

    active: Option<ActiveSession>,
}

struct ActiveSession {
    stop_tx: mpsc::Sender<StopReason>,
    supervisor: JoinHandle<()>,
    started_at: Instant,
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            config,
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            clock: Arc::new(Mutex::new(SessionClock::new())),
            event_tx,
            active: None,
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.event_tx.subscribe()
    }

    /// Receiver for the `MM:SS` session-clock display.
    pub fn clock_display(&self) -> watch::Receiver<String> {
        self.clock.lock().display()
    }

    /// Elapsed time of the active session, zero when idle.
    pub fn elapsed(&self) -> Duration {
        match (&self.active, self.state()) {
            (Some(active), RecordingState::Recording) => active.started_at.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Start recording
    ///
    /// Allocates a fresh video-sized surface, negotiates the encoder
    /// format, starts the draw loop, arms the auto-stop timer, and
    /// starts the session clock. Only legal from `Idle`.
    pub async fn start(
        &mut self,
        device: &CaptureDevice,
        overlay: OverlayAsset,
        factory: Arc<dyn EncoderFactory>,
        store: Arc<ResultStore>,
        exporter: Arc<Exporter>,
    ) -> Result<(), RecordError> {
        if self.state() != RecordingState::Idle {
            return Err(RecordError::AlreadyRecording);
        }

        let (frame_width, frame_height) = device.frame_size();
        if frame_width == 0 || frame_height == 0 {
            return Err(RecordError::CameraNotReady);
        }

        if !factory.supports_surface_stream() {
            return Err(RecordError::UnsupportedPlatform(
                "no surface-backed media stream".to_string(),
            ));
        }

        // Fresh composition surface per session, never shared.
        let surface: SharedSurface = Arc::new(Mutex::new(FrameBuffer::new(
            self.config.width,
            self.config.height,
        )));

        let mime_type = negotiate_mime_type(&*factory, &MIME_CANDIDATES);
        tracing::info!(
            ?mime_type,
            max_duration_ms = self.config.max_duration_ms,
            "starting recording"
        );

        let stream = SurfaceStream {
            surface: surface.clone(),
            frame_rate: self.config.frame_rate,
            audio: device.audio.clone(),
        };
        let options = EncoderOptions {
            mime_type: mime_type.clone(),
            video_bits_per_second: self.config.video_bits_per_second,
            audio_bits_per_second: self.config.audio_bits_per_second,
        };
        let (mut encoder, chunk_rx) = factory.create(stream, options)?;
        encoder.start(self.config.timeslice()).await?;

        // The crop is fixed for the whole session, from the live frame
        // size at this instant.
        let crop = cover_crop(
            frame_width,
            frame_height,
            self.config.width,
            self.config.height,
        )?;

        let draw_cancel = Arc::new(AtomicBool::new(false));
        let draw_task = tokio::spawn(run_draw_loop(
            surface,
            device.video.clone(),
            overlay,
            crop,
            device.facing.is_mirrored(),
            self.config.frame_rate,
            draw_cancel.clone(),
        ));

        let started_at = Instant::now();
        self.clock.lock().start(started_at);

        let (stop_tx, stop_rx) = mpsc::channel(1);
        *self.state.write() = RecordingState::Recording;
        let _ = self.event_tx.send(RecorderEvent::Started);

        let supervisor = tokio::spawn(run_session(SessionContext {
            state: self.state.clone(),
            clock: self.clock.clone(),
            event_tx: self.event_tx.clone(),
            encoder,
            chunk_rx,
            stop_rx,
            draw_cancel,
            draw_task,
            max_duration: self.config.max_duration(),
            store,
            exporter,
        }));

        self.active = Some(ActiveSession {
            stop_tx,
            supervisor,
            started_at,
        });
        Ok(())
    }

    /// Request a stop with the given reason.
    ///
    /// Only meaningful while `Recording`; a no-op otherwise. The first
    /// stop signal (manual or auto-stop) wins; anything later is
    /// dropped until the machine is back in `Idle`.
    pub fn request_stop(&self, reason: StopReason) {
        if self.state() != RecordingState::Recording {
            tracing::debug!(?reason, "stop requested outside Recording; ignoring");
            return;
        }
        if let Some(active) = &self.active {
            if active.stop_tx.try_send(reason).is_err() {
                tracing::debug!(?reason, "stop already requested");
            }
        }
    }

    /// Discard any active session and wait for it to wind down.
    pub async fn shutdown(&mut self) {
        if self.state() == RecordingState::Recording {
            self.request_stop(StopReason::Discard);
        }
        if let Some(active) = self.active.take() {
            let _ = active.supervisor.await;
        }
    }
}

struct SessionContext {
    state: Arc<RwLock<RecordingState>>,
    clock: Arc<Mutex<SessionClock>>,
    event_tx: broadcast::Sender<RecorderEvent>,
    encoder: Box<dyn MediaEncoder>,
    chunk_rx: mpsc::UnboundedReceiver<EncodedChunk>,
    stop_rx: mpsc::Receiver<StopReason>,
    draw_cancel: Arc<AtomicBool>,
    draw_task: JoinHandle<()>,
    max_duration: Duration,
    store: Arc<ResultStore>,
    exporter: Arc<Exporter>,
}

/// One recording session, start to finish.
///
/// Waits for the first stop signal (the auto-stop timer or a manual
/// request), then finalizes and dispatches the pending action.
async fn run_session(mut ctx: SessionContext) {
    let reason = tokio::select! {
        _ = time::sleep(ctx.max_duration) => {
            tracing::info!("maximum duration reached, stopping");
            StopReason::Normal
        }
        reason = ctx.stop_rx.recv() => reason.unwrap_or(StopReason::Normal),
    };
    // Consuming the select above also disarms the auto-stop timer, so a
    // manual stop can never be followed by a duplicate timer stop.

    *ctx.state.write() = RecordingState::Finalizing;
    let action = PendingAction::from(reason);
    tracing::info!(?action, "stopping recording");

    if let Err(e) = ctx.encoder.stop().await {
        tracing::warn!("encoder stop failed: {e}");
        let _ = ctx.event_tx.send(RecorderEvent::Error(e.to_string()));
    }

    // Concatenate every delivered chunk, strictly in arrival order.
    let mut data = Vec::new();
    while let Some(chunk) = ctx.chunk_rx.recv().await {
        data.extend_from_slice(&chunk);
    }

    // No frame may be drawn past this point.
    ctx.draw_cancel.store(true, Ordering::Relaxed);
    let _ = ctx.draw_task.await;
    ctx.clock.lock().stop();

    let result = CapturedResult::video(data, ctx.encoder.mime_type());
    tracing::info!(bytes = result.len(), ?action, "recording finalized");

    match action {
        PendingAction::None => {
            // Present for save/discard; the result stays retained.
            ctx.store.set(result);
        }
        PendingAction::Export => {
            let request = ExportRequest::from_result(&result);
            match ctx.exporter.export(&request).await {
                Ok(_) => ctx.store.clear(MediaKind::Video),
                Err(e) => {
                    // Keep the binary around for a manual retry.
                    tracing::warn!("export failed: {e}");
                    let _ = ctx.event_tx.send(RecorderEvent::Error(e.to_string()));
                    ctx.store.set(result);
                }
            }
        }
        PendingAction::Discard => {
            ctx.store.clear(MediaKind::Video);
        }
    }

    *ctx.state.write() = RecordingState::Idle;
    let _ = ctx.event_tx.send(RecorderEvent::Finalized { action });
}

/// Continuous composition loop feeding the record surface.
///
/// Each tick clears the surface, draws the current live frame through
/// the same mirror rule as stills with the session-fixed crop, and
/// draws the overlay only if it has already loaded. The cancel flag is
/// consulted before every draw.
async fn run_draw_loop(
    surface: SharedSurface,
    video: Arc<dyn VideoTrack>,
    overlay: OverlayAsset,
    crop: CropRect,
    mirror: bool,
    frame_rate: u32,
    cancel: Arc<AtomicBool>,
) {
    let period = Duration::from_secs(1) / frame_rate.max(1);
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let Some(frame) = video.current_frame() else {
            continue;
        };
        let mut surface = surface.lock();
        surface.clear();
        surface.draw_frame_cover(&frame, &crop, mirror);
        overlay.draw_if_loaded(&mut surface);
    }
}

//! Booth session controller
//!
//! One object owning the whole capture/record/export lifecycle:
//! configuration, camera session, overlay, retained results, recorder,
//! and exporter, with an explicit `new -> use -> dispose` lifecycle.

use std::sync::Arc;

use crate::capture::CaptureSession;
use crate::config::BoothConfig;
use crate::export::{BrowserEnvironment, DownloadSink, Exporter, ExportRequest, FileShare, SaveDialog, StrategyKind};
use crate::media::{CapturedResult, MediaKind, ResultStore};
use crate::overlay::{OverlayAsset, OverlayLoader};
use crate::recorder::{
    EncoderFactory, RecordError, Recorder, RecorderConfig, RecorderEvent, RecordingState,
    StopReason,
};
use crate::utils::error::BoothResult;

/// The host-supplied platform capabilities the booth runs on.
pub struct HostPlatform {
    pub camera: Arc<dyn crate::capture::CameraProvider>,
    pub overlay_loader: Arc<dyn OverlayLoader>,
    pub encoder: Arc<dyn EncoderFactory>,
    pub share: Arc<dyn FileShare>,
    pub save_dialog: Arc<dyn SaveDialog>,
    pub download: Arc<dyn DownloadSink>,
    /// User-agent string of the hosting browser context
    pub user_agent: String,
}

/// Owns one booth session end to end.
pub struct BoothController {
    config: BoothConfig,
    camera: CaptureSession,
    overlay: OverlayAsset,
    overlay_loader: Arc<dyn OverlayLoader>,
    results: Arc<ResultStore>,
    recorder: Recorder,
    encoder: Arc<dyn EncoderFactory>,
    exporter: Arc<Exporter>,
}

impl BoothController {
    pub fn new(config: BoothConfig, platform: HostPlatform) -> Self {
        let recorder_config = RecorderConfig {
            max_duration_ms: config.max_recording_secs * 1_000,
            ..RecorderConfig::default()
        };
        let exporter = Arc::new(Exporter::new(
            BrowserEnvironment::from_user_agent(&platform.user_agent),
            platform.share,
            platform.save_dialog,
            platform.download,
        ));
        Self {
            camera: CaptureSession::new(platform.camera),
            overlay: OverlayAsset::unset(),
            overlay_loader: platform.overlay_loader,
            results: Arc::new(ResultStore::new()),
            recorder: Recorder::new(recorder_config),
            encoder: platform.encoder,
            exporter,
            config,
        }
    }

    pub fn config(&self) -> &BoothConfig {
        &self.config
    }

    /// Background image path for the host's pre-capture screen.
    pub fn start_background(&self) -> &str {
        &self.config.start_background
    }

    pub fn overlay(&self) -> &OverlayAsset {
        &self.overlay
    }

    /// Kick off the configured overlay load. A missing or broken asset
    /// never blocks capture; it is simply omitted from composition.
    pub fn load_overlay(&self) {
        self.overlay
            .begin_load(self.overlay_loader.clone(), &self.config.overlay_path);
    }

    /// Open the camera for the current facing.
    ///
    /// Exclusive access (`&mut self`) guarantees a second open cannot
    /// start while one is in flight.
    pub async fn open_camera(&mut self) -> BoothResult<()> {
        self.camera.open().await?;
        Ok(())
    }

    /// Toggle between front and back camera. Rejected while a recording
    /// is active: the live device is owned by the session.
    pub async fn switch_facing(&mut self) -> BoothResult<()> {
        if self.recorder.state() != RecordingState::Idle {
            return Err(RecordError::RecordingInProgress.into());
        }
        self.camera.switch_facing().await?;
        Ok(())
    }

    /// Whether the preview should be displayed mirrored.
    pub fn mirrored(&self) -> bool {
        self.camera.mirrored()
    }

    /// Capture a framed still, replacing any prior photo. Returns
    /// `false` when the camera has no frame yet (no-op).
    pub async fn capture_photo(&self) -> BoothResult<bool> {
        match self.camera.capture_still(&self.overlay).await? {
            Some(result) => {
                self.results.set(result);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn last_photo(&self) -> Option<CapturedResult> {
        self.results.last(MediaKind::Photo)
    }

    pub fn last_video(&self) -> Option<CapturedResult> {
        self.results.last(MediaKind::Video)
    }

    /// Drop the retained photo and return to the pre-capture view.
    pub fn retake_photo(&self) {
        self.results.clear(MediaKind::Photo);
    }

    /// Export the retained photo. `None` when there is nothing to save.
    pub async fn save_photo(&self) -> BoothResult<Option<StrategyKind>> {
        let Some(photo) = self.results.last(MediaKind::Photo) else {
            return Ok(None);
        };
        let outcome = self.exporter.export(&ExportRequest::from_result(&photo)).await?;
        Ok(Some(outcome))
    }

    /// Start recording a framed clip with the configured maximum
    /// duration.
    pub async fn start_recording(&mut self) -> BoothResult<()> {
        let Some(device) = self.camera.device() else {
            return Err(RecordError::CameraNotReady.into());
        };
        self.recorder
            .start(
                device,
                self.overlay.clone(),
                self.encoder.clone(),
                self.results.clone(),
                self.exporter.clone(),
            )
            .await?;
        Ok(())
    }

    /// Save the clip: while recording, stop-and-export once finalized;
    /// otherwise export the retained result directly.
    pub async fn save_video(&self) -> BoothResult<Option<StrategyKind>> {
        if self.recorder.state() == RecordingState::Recording {
            self.recorder.request_stop(StopReason::Export);
            return Ok(None);
        }
        let Some(video) = self.results.last(MediaKind::Video) else {
            return Ok(None);
        };
        let outcome = self.exporter.export(&ExportRequest::from_result(&video)).await?;
        Ok(Some(outcome))
    }

    /// Retake: while recording, stop-and-discard; otherwise drop the
    /// retained clip.
    pub fn retake_video(&self) {
        if self.recorder.state() == RecordingState::Recording {
            self.recorder.request_stop(StopReason::Discard);
            return;
        }
        self.results.clear(MediaKind::Video);
    }

    pub fn recording_state(&self) -> RecordingState {
        self.recorder.state()
    }

    /// Subscribe to recorder lifecycle events.
    pub fn recorder_events(&self) -> tokio::sync::broadcast::Receiver<RecorderEvent> {
        self.recorder.subscribe()
    }

    /// Receiver for the `MM:SS` recording clock display.
    pub fn clock_display(&self) -> tokio::sync::watch::Receiver<String> {
        self.recorder.clock_display()
    }

    /// Tear down: discard any active recording, stop the camera, and
    /// drop retained results.
    pub async fn dispose(&mut self) {
        self.recorder.shutdown().await;
        self.camera.dispose();
        self.results.clear_all();
        tracing::info!("booth disposed");
    }
}

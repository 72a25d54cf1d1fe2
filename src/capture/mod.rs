//! Camera capture session
//!
//! Owns the live camera/microphone device, the facing flip, the mirror
//! rule, and single-frame composited stills.

pub mod traits;

pub use traits::{
    AudioTrack, CameraProvider, CaptureDevice, CaptureError, CaptureRequest, Facing, VideoTrack,
};

use std::sync::Arc;

use crate::geometry::cover_crop;
use crate::media::CapturedResult;
use crate::overlay::OverlayAsset;
use crate::surface::FrameBuffer;

/// Destination size for composited stills.
pub const PHOTO_WIDTH: u32 = 1080;
pub const PHOTO_HEIGHT: u32 = 1920;

/// JPEG quality for encoded stills (0.95).
pub const JPEG_QUALITY: u8 = 95;

/// Owns the live capture device and produces composited stills.
pub struct CaptureSession {
    provider: Arc<dyn CameraProvider>,
    facing: Facing,
    device: Option<CaptureDevice>,
}

impl CaptureSession {
    pub fn new(provider: Arc<dyn CameraProvider>) -> Self {
        Self {
            provider,
            facing: Facing::Environment,
            device: None,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Whether output and preview are horizontally mirrored.
    pub fn mirrored(&self) -> bool {
        self.facing.is_mirrored()
    }

    pub fn device(&self) -> Option<&CaptureDevice> {
        self.device.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Acquire a device for the current facing, stopping any previous
    /// tracks first.
    pub async fn open(&mut self) -> Result<(), CaptureError> {
        if let Some(device) = self.device.take() {
            device.stop_tracks();
        }
        let device = self
            .provider
            .acquire(&CaptureRequest::new(self.facing))
            .await?;
        tracing::info!(facing = ?self.facing, "camera opened");
        self.device = Some(device);
        Ok(())
    }

    /// Toggle the facing and re-acquire the device.
    ///
    /// On failure the facing rolls back so a retry targets the camera
    /// that was active before.
    pub async fn switch_facing(&mut self) -> Result<(), CaptureError> {
        let previous = self.facing;
        self.facing = self.facing.toggled();
        match self.open().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.facing = previous;
                Err(e)
            }
        }
    }

    /// Composite the current live frame with the overlay into a still.
    ///
    /// Returns `Ok(None)` when there is no device or no frame yet (the
    /// caller treats that as a no-op). The frame is cover-cropped onto a
    /// 1080x1920 surface, mirrored for the front camera, overlaid once
    /// the overlay settles, and encoded as JPEG.
    pub async fn capture_still(
        &self,
        overlay: &OverlayAsset,
    ) -> Result<Option<CapturedResult>, CaptureError> {
        let Some(device) = &self.device else {
            return Ok(None);
        };
        let (width, height) = device.frame_size();
        if width == 0 || height == 0 {
            return Ok(None);
        }
        let Some(frame) = device.video.current_frame() else {
            return Ok(None);
        };

        let crop = cover_crop(width, height, PHOTO_WIDTH, PHOTO_HEIGHT)?;
        let mut surface = FrameBuffer::new(PHOTO_WIDTH, PHOTO_HEIGHT);
        surface.draw_frame_cover(&frame, &crop, self.mirrored());
        overlay.draw_when_ready(&mut surface).await;

        let bytes = surface
            .encode_jpeg(JPEG_QUALITY)
            .map_err(|e| CaptureError::Encoding(e.to_string()))?;
        tracing::info!(bytes = bytes.len(), "still captured");
        Ok(Some(CapturedResult::photo(bytes)))
    }

    /// Stop all tracks and drop the device.
    pub fn dispose(&mut self) {
        if let Some(device) = self.device.take() {
            device.stop_tracks();
            tracing::info!("capture device released");
        }
    }
}

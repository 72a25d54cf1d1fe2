//! Static graphic overlay
//!
//! A single image resource composited on top of every still and every
//! recorded frame. The asset may be unset, still loading, loaded, or
//! failed; composition tolerates all four states.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;

use crate::surface::FrameBuffer;

/// Decoded overlay image, RGBA8.
#[derive(Debug, Clone)]
pub struct OverlayImage {
    pub width: u32,
    pub height: u32,
    pub data: Arc<Vec<u8>>,
}

/// Lifecycle of the overlay resource.
#[derive(Debug, Clone, Default)]
pub enum OverlayState {
    #[default]
    Unset,
    Loading,
    Loaded(OverlayImage),
    Failed,
}

/// Host hook that fetches the overlay resource bytes.
#[async_trait]
pub trait OverlayLoader: Send + Sync {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>>;
}

struct Inner {
    state: RwLock<OverlayState>,
    // Flips to true exactly once per load, on load-or-fail.
    settled_tx: watch::Sender<bool>,
}

/// Shared handle to the overlay resource.
#[derive(Clone)]
pub struct OverlayAsset {
    inner: Arc<Inner>,
}

impl OverlayAsset {
    /// An overlay that is not configured; composition skips it.
    pub fn unset() -> Self {
        let (settled_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(OverlayState::Unset),
                settled_tx,
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> OverlayState {
        self.inner.state.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.inner.state.read(), OverlayState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(*self.inner.state.read(), OverlayState::Failed)
    }

    /// Start fetching and decoding the overlay in the background.
    ///
    /// Must be called from within a tokio runtime. A fetch or decode
    /// failure marks the overlay failed, and it is omitted from all
    /// composition from then on.
    pub fn begin_load(&self, loader: Arc<dyn OverlayLoader>, path: &str) {
        {
            let mut state = self.inner.state.write();
            *state = OverlayState::Loading;
        }
        self.inner.settled_tx.send_replace(false);

        let inner = self.inner.clone();
        let path = path.to_string();
        tokio::spawn(async move {
            let loaded = match loader.fetch(&path).await {
                Ok(bytes) => match decode_png(&bytes) {
                    Ok(image) => {
                        tracing::info!(path = %path, width = image.width, height = image.height, "overlay loaded");
                        Some(image)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path, "overlay decode failed: {e:#}");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path, "overlay fetch failed: {e:#}");
                    None
                }
            };

            *inner.state.write() = match loaded {
                Some(image) => OverlayState::Loaded(image),
                None => OverlayState::Failed,
            };
            inner.settled_tx.send_replace(true);
        });
    }

    /// Draw the overlay stretched over the surface, only if it has
    /// finished loading. Used by the record loop: a not-yet-ready
    /// overlay is skipped for this tick only.
    pub fn draw_if_loaded(&self, surface: &mut FrameBuffer) {
        let image = match &*self.inner.state.read() {
            OverlayState::Loaded(image) => image.clone(),
            _ => return,
        };
        surface.draw_image_stretched(&image.data, image.width, image.height);
    }

    /// Draw the overlay, waiting for an in-flight load to settle first.
    ///
    /// Absent or failed overlays complete immediately without drawing;
    /// a loading overlay is awaited exactly once, then drawn-or-skipped.
    /// Always completes. Used by still capture.
    pub async fn draw_when_ready(&self, surface: &mut FrameBuffer) {
        // Subscribe before reading the state so a settle between the
        // read and the wait is not missed.
        let mut settled_rx = self.inner.settled_tx.subscribe();

        {
            match &*self.inner.state.read() {
                OverlayState::Loaded(image) => {
                    let image = image.clone();
                    surface.draw_image_stretched(&image.data, image.width, image.height);
                    return;
                }
                OverlayState::Unset | OverlayState::Failed => return,
                OverlayState::Loading => {}
            }
        }

        if settled_rx.wait_for(|settled| *settled).await.is_err() {
            return;
        }

        if let OverlayState::Loaded(image) = &*self.inner.state.read() {
            let image = image.clone();
            surface.draw_image_stretched(&image.data, image.width, image.height);
        }
    }
}

/// Decode PNG bytes into RGBA8.
fn decode_png(bytes: &[u8]) -> anyhow::Result<OverlayImage> {
    let decoder = png::Decoder::new(bytes);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    // Convert to RGBA if needed
    let data = match info.color_type {
        png::ColorType::Rgba => buf[..info.buffer_size()].to_vec(),
        png::ColorType::Rgb => {
            // Add alpha channel
            let rgb = &buf[..info.buffer_size()];
            let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
            for chunk in rgb.chunks(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        other => anyhow::bail!("unsupported PNG color type: {other:?}"),
    };

    Ok(OverlayImage {
        width: info.width,
        height: info.height,
        data: Arc::new(data),
    })
}

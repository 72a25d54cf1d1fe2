//! Framebooth - a camera photo/video booth pipeline.
//!
//! Captures live camera input, composites it with a static graphic
//! overlay, records framed clips with a bounded duration, and exports
//! results through an ordered chain of host platform strategies. The
//! host supplies the primitives (camera, encoder, share sheet, save
//! dialog, download) behind the traits in [`capture`], [`overlay`],
//! [`recorder::encoder`], and [`export::capabilities`].

pub mod booth;
pub mod capture;
pub mod clock;
pub mod config;
pub mod export;
pub mod geometry;
pub mod media;
pub mod overlay;
pub mod recorder;
pub mod surface;
pub mod utils;

#[cfg(test)]
mod testing;

pub use booth::{BoothController, HostPlatform};
pub use config::BoothConfig;
pub use utils::error::{BoothError, BoothResult, UserNotice};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for hosts that do not install their own
/// subscriber. Call at most once.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framebooth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

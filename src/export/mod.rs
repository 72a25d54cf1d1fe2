//! Export pipeline
//!
//! Persists a finished binary through an ordered chain of platform
//! strategies. The first delivery wins; per-strategy failures are
//! swallowed and advance the chain; the direct download always runs
//! last as the final guarantee.

pub mod capabilities;
pub mod environment;
pub mod strategies;
pub mod types;

pub use capabilities::{DownloadSink, FileShare, SaveDialog};
pub use environment::BrowserEnvironment;
pub use strategies::{
    DirectDownload, ExportStrategy, InAppShare, NativeSaveDialog, NewTabFallback, ShareSheet,
};
pub use types::{Attempt, ExportError, ExportRequest, StrategyKind};

use std::sync::Arc;

/// Drives the ordered export strategy chain.
pub struct Exporter {
    strategies: Vec<Box<dyn ExportStrategy>>,
    fallback: DirectDownload,
}

impl Exporter {
    pub fn new(
        environment: BrowserEnvironment,
        share: Arc<dyn FileShare>,
        dialog: Arc<dyn SaveDialog>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        let strategies: Vec<Box<dyn ExportStrategy>> = vec![
            Box::new(InAppShare {
                environment: environment.clone(),
                share: share.clone(),
            }),
            Box::new(NativeSaveDialog {
                environment: environment.clone(),
                dialog,
            }),
            Box::new(ShareSheet { share }),
            Box::new(NewTabFallback {
                environment,
                sink: sink.clone(),
            }),
        ];
        Self {
            strategies,
            fallback: DirectDownload { sink },
        }
    }

    /// Persist the binary through the first strategy that delivers.
    ///
    /// Never propagates per-strategy failures; only the final fallback
    /// failing yields an error, and the caller keeps the binary for a
    /// retry.
    pub async fn export(&self, request: &ExportRequest) -> Result<StrategyKind, ExportError> {
        for strategy in &self.strategies {
            match strategy.attempt(request).await {
                Attempt::Delivered => {
                    tracing::info!(strategy = ?strategy.kind(), filename = %request.filename, "export delivered");
                    return Ok(strategy.kind());
                }
                Attempt::NotApplicable => {}
                Attempt::Failed(e) => {
                    tracing::debug!(strategy = ?strategy.kind(), "export strategy failed: {e:#}");
                }
            }
        }

        match self.fallback.attempt(request).await {
            Attempt::Delivered => {
                tracing::info!(filename = %request.filename, "export delivered via download");
                Ok(StrategyKind::Download)
            }
            Attempt::NotApplicable | Attempt::Failed(_) => Err(ExportError::Exhausted(format!(
                "download fallback failed for {}",
                request.filename
            ))),
        }
    }
}
